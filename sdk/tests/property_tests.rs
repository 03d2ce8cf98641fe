use proptest::prelude::*;
use sdk::errors::{DlxErrorExt, EngineError};
use sdk::types::{Agent, AgentStatus, Directive, DirectiveCategory, DirectivePriority, Task};

// User hints are static strings and never echo the raw error payload
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9_]{8,40}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::Network(error_str.clone()),
            EngineError::Proxy(error_str.clone()),
            EngineError::ServiceNotConfigured(error_str.clone()),
            EngineError::NotFound(error_str.clone()),
            EngineError::InvalidTransition(error_str.clone()),
            EngineError::Serialization(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Directives and agents survive a JSON round-trip with arbitrary text fields
proptest! {
    #[test]
    fn test_directive_json_roundtrip(
        title in "\\PC{0,40}",
        description in "\\PC{0,80}",
        task_names in prop::collection::vec("\\PC{1,20}", 0..6),
    ) {
        let directive = Directive {
            id: "dir-1".to_string(),
            title,
            description,
            category: DirectiveCategory::Standard,
            priority: DirectivePriority::Medium,
            status: Default::default(),
            deployment_status: Default::default(),
            tasks: task_names
                .iter()
                .enumerate()
                .map(|(i, name)| Task::new(format!("task-{}", i), name.clone()))
                .collect(),
            api_key_required: false,
            deployable: false,
        };

        let json = serde_json::to_string(&directive).unwrap();
        let parsed: Directive = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(directive, parsed);
    }

    #[test]
    fn test_agent_queue_order_preserved(queue in prop::collection::vec("[a-z0-9-]{1,12}", 0..10)) {
        let mut agent = Agent::new("a-1", "Agent", "objective");
        agent.status = AgentStatus::Training;
        agent.task_queue = queue.iter().cloned().collect();

        let json = serde_json::to_string(&agent).unwrap();
        let parsed: Agent = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.task_queue.into_iter().collect::<Vec<_>>(), queue);
    }
}
