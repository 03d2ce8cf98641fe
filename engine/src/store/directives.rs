//! Directive Store
//!
//! Ordered collection of directives, most recent first. Directives are never
//! deleted.

use sdk::types::{
    DeploymentStatus, Directive, DirectiveCategory, DirectivePriority, DirectiveStatus, Task,
};
use serde::Deserialize;

/// Partial update applied by [`DirectiveStore::update`]
///
/// `tasks` replaces the whole task list when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectivePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<DirectiveCategory>,
    pub priority: Option<DirectivePriority>,
    pub status: Option<DirectiveStatus>,
    pub deployment_status: Option<DeploymentStatus>,
    pub tasks: Option<Vec<Task>>,
}

impl DirectivePatch {
    pub fn deployment(status: DeploymentStatus) -> Self {
        Self {
            deployment_status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct DirectiveStore {
    directives: Vec<Directive>,
}

impl DirectiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive at the head of the list
    pub fn add(&mut self, directive: Directive) {
        tracing::debug!(directive_id = %directive.id, "Directive added");
        self.directives.insert(0, directive);
    }

    /// Merge a partial update into a directive
    ///
    /// Returns `false` if the directive does not exist. A deployment status
    /// that would move the directive backwards is dropped; the other fields
    /// of the patch still apply.
    pub fn update(&mut self, id: &str, patch: DirectivePatch) -> bool {
        let Some(directive) = self.get_mut(id) else {
            return false;
        };

        if let Some(title) = patch.title {
            directive.title = title;
        }
        if let Some(description) = patch.description {
            directive.description = description;
        }
        if let Some(category) = patch.category {
            directive.category = category;
        }
        if let Some(priority) = patch.priority {
            directive.priority = priority;
        }
        if let Some(status) = patch.status {
            directive.status = status;
        }
        if let Some(next) = patch.deployment_status {
            if directive.deployment_status.can_advance_to(next) {
                directive.deployment_status = next;
            } else {
                tracing::warn!(
                    directive_id = %id,
                    from = %directive.deployment_status,
                    to = %next,
                    "Ignoring deployment status regression"
                );
            }
        }
        if let Some(tasks) = patch.tasks {
            directive.tasks = tasks;
        }

        true
    }

    pub fn get(&self, id: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Directive> {
        self.directives.iter_mut().find(|d| d.id == id)
    }

    /// All directives, most recent first
    pub fn list(&self) -> &[Directive] {
        &self.directives
    }

    /// Id of the directive owning `task_id`
    pub fn find_task(&self, task_id: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|d| d.task(task_id).is_some())
            .map(|d| d.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(id: &str) -> Directive {
        Directive {
            id: id.to_string(),
            title: format!("Directive {}", id),
            description: String::new(),
            category: DirectiveCategory::Standard,
            priority: DirectivePriority::Medium,
            status: DirectiveStatus::Pending,
            deployment_status: DeploymentStatus::None,
            tasks: vec![Task::new(format!("{}-t1", id), "Plan")],
            api_key_required: false,
            deployable: false,
        }
    }

    #[test]
    fn test_add_inserts_at_head() {
        let mut store = DirectiveStore::new();
        store.add(directive("a"));
        store.add(directive("b"));

        let ids: Vec<_> = store.list().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = DirectiveStore::new();
        store.add(directive("a"));
        assert!(!store.update(
            "missing",
            DirectivePatch {
                title: Some("x".to_string()),
                ..Default::default()
            }
        ));
        assert_eq!(store.get("a").unwrap().title, "Directive a");
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = DirectiveStore::new();
        store.add(directive("a"));
        store.update(
            "a",
            DirectivePatch {
                title: Some("Renamed".to_string()),
                priority: Some(DirectivePriority::High),
                ..Default::default()
            },
        );

        let d = store.get("a").unwrap();
        assert_eq!(d.title, "Renamed");
        assert_eq!(d.priority, DirectivePriority::High);
        assert_eq!(d.category, DirectiveCategory::Standard);
    }

    #[test]
    fn test_deployment_status_never_regresses() {
        let mut store = DirectiveStore::new();
        store.add(directive("a"));
        store.update("a", DirectivePatch::deployment(DeploymentStatus::Deployed));
        store.update("a", DirectivePatch::deployment(DeploymentStatus::InReview));

        assert_eq!(store.get("a").unwrap().deployment_status, DeploymentStatus::Deployed);
    }

    #[test]
    fn test_find_task() {
        let mut store = DirectiveStore::new();
        store.add(directive("a"));
        store.add(directive("b"));

        assert_eq!(store.find_task("b-t1"), Some("b"));
        assert_eq!(store.find_task("nope"), None);
    }
}
