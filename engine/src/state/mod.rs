//! Command center state
//!
//! [`CommandState`] owns every store plus the chronicle, the active
//! compliance alerts and the health monitor. It is purely synchronous: every
//! operation mutates the stores and appends to the chronicle in one call, and
//! returns what the async runtime must start next. The runtime keeps it
//! behind a single mutex (see [`crate::center::CommandCenter`]).
//!
//! Task lifecycle and deployment operations live in [`crate::lifecycle`] and
//! [`crate::deployment`]; this module holds the rest.

pub mod seed;

use crate::chronicle::Chronicle;
use crate::compliance::{AlertBoard, ComplianceScanner};
use crate::health::{HealthEvent, HealthMonitor};
use crate::lifecycle::Rejection;
use crate::store::mind_map::PROMOTED_TASK_PLAN;
use crate::store::{AgentStore, DirectiveStore, IdGenerator, KnowledgeBase, MindMap, ReviewBoard};
use rand::Rng;
use sdk::types::{
    Agent, AiService, ChronicleLog, ChronicleLogType, CodeReviewItem, ComplianceAlert,
    DeploymentStatus, Directive, DirectiveCategory, DirectivePriority, DirectiveStatus,
    KnowledgeFile, KnowledgeFileType, MindMapNode, Position, Task,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything the dashboard renders, in one document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub directives: Vec<Directive>,
    pub agents: Vec<Agent>,
    pub reviews: Vec<CodeReviewItem>,
    pub alerts: Vec<ComplianceAlert>,
    pub chronicle: Vec<ChronicleLog>,
    pub knowledge: Vec<KnowledgeFile>,
    pub mind_map: Vec<MindMapNode>,
    pub system_health: f64,
}

/// Operator input when turning a mind-map node into a directive
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    /// Defaults to the node label
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    pub category: DirectiveCategory,
    pub priority: DirectivePriority,
}

pub struct CommandState {
    pub directives: DirectiveStore,
    pub agents: AgentStore,
    pub reviews: ReviewBoard,
    pub knowledge: KnowledgeBase,
    pub mind_map: MindMap,
    pub alerts: AlertBoard,
    pub chronicle: Chronicle,
    pub health: HealthMonitor,
    pub(crate) ids: IdGenerator,
    /// Directives whose deployer is currently running
    pub(crate) deploying: HashSet<String>,
}

impl CommandState {
    /// Create an empty state
    pub fn new(health: HealthMonitor) -> Self {
        Self {
            directives: DirectiveStore::new(),
            agents: AgentStore::new(),
            reviews: ReviewBoard::new(),
            knowledge: KnowledgeBase::new(),
            mind_map: MindMap::new(),
            alerts: AlertBoard::new(),
            chronicle: Chronicle::new(),
            health,
            ids: IdGenerator::new(),
            deploying: HashSet::new(),
        }
    }

    /// Create a state populated with the initial directives, agents,
    /// knowledge files, mind map and reviews
    pub fn seeded(health: HealthMonitor) -> Self {
        let mut state = Self::new(health);
        seed::apply(&mut state);
        state
    }

    pub fn record(&mut self, kind: ChronicleLogType, message: impl Into<String>) -> ChronicleLog {
        self.chronicle.record(kind, message)
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        self.ids.next_id(prefix)
    }

    pub fn is_deploying(&self, directive_id: &str) -> bool {
        self.deploying.contains(directive_id)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            directives: self.directives.list().to_vec(),
            agents: self.agents.list().to_vec(),
            reviews: self.reviews.list().to_vec(),
            alerts: self.alerts.list().to_vec(),
            chronicle: self.chronicle.entries(),
            knowledge: self.knowledge.list().to_vec(),
            mind_map: self.mind_map.list().to_vec(),
            system_health: self.health.value(),
        }
    }

    // ---- Compliance ----

    /// Run one compliance sweep, raising and chronicling new alerts
    pub fn run_compliance_scan(&mut self, scanner: &ComplianceScanner) -> Vec<ComplianceAlert> {
        let found = scanner.scan(self.knowledge.list(), self.directives.list(), &self.alerts);

        for alert in &found {
            self.chronicle.record(
                ChronicleLogType::Anomaly,
                format!("Compliance Alert: {} found in {}", alert.issue, alert.location),
            );
        }
        self.alerts.extend(found.iter().cloned());

        found
    }

    /// Dismiss an active alert
    pub fn acknowledge_alert(&mut self, alert_id: &str) -> Result<ComplianceAlert, Rejection> {
        let alert = self
            .alerts
            .acknowledge(alert_id)
            .ok_or_else(|| Rejection::UnknownAlert(alert_id.to_string()))?;

        self.chronicle.record(
            ChronicleLogType::System,
            format!("Compliance alert {} acknowledged by operator.", alert.id),
        );
        Ok(alert)
    }

    // ---- Health ----

    /// Advance system health with a known sample
    pub fn step_health(&mut self, r: f64) -> Option<HealthEvent> {
        let event = self.health.step(r);
        match event {
            Some(HealthEvent::Critical(value)) => {
                self.chronicle.record(
                    ChronicleLogType::Anomaly,
                    format!(
                        "System health critical: {:.1}%. System Guardian investigating.",
                        value
                    ),
                );
            }
            Some(HealthEvent::Restored(value)) => {
                self.chronicle.record(
                    ChronicleLogType::System,
                    format!("System health restored to {:.1}%. Anomaly resolved.", value),
                );
            }
            None => {}
        }
        event
    }

    /// Advance system health with a sample drawn from `rng`
    pub fn tick_health<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<HealthEvent> {
        let r: f64 = rng.gen();
        self.step_health(r)
    }

    // ---- Knowledge base ----

    pub fn register_knowledge(&mut self, name: &str, kind: KnowledgeFileType) -> KnowledgeFile {
        let id = self.ids.next_id("file");
        let file = self.knowledge.register(id, name, kind);
        self.chronicle.record(
            ChronicleLogType::System,
            format!("Knowledge file \"{}\" uploaded. Embedding started.", file.name),
        );
        file
    }

    // ---- Mind map ----

    /// Add a node under an existing parent (or as a new root)
    pub fn add_mind_map_node(
        &mut self,
        label: &str,
        parent_id: Option<String>,
        position: Position,
        ai_service: Option<AiService>,
    ) -> Result<MindMapNode, Rejection> {
        if let Some(parent) = &parent_id {
            if self.mind_map.get(parent).is_none() {
                return Err(Rejection::UnknownNode(parent.clone()));
            }
        }

        let id = self.ids.next_id("node");
        Ok(self.mind_map.add_node(id, label, parent_id, position, ai_service))
    }

    /// Create a directive from a node with the standard four-step plan
    pub fn promote_node(&mut self, node_id: &str, promotion: Promotion) -> Result<Directive, Rejection> {
        let node = self
            .mind_map
            .get(node_id)
            .ok_or_else(|| Rejection::UnknownNode(node_id.to_string()))?;
        if node.is_promoted {
            return Err(Rejection::NodeAlreadyPromoted(node_id.to_string()));
        }

        let title = promotion
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| node.label.clone());
        let directive_id = self.ids.next_id("dir");
        let tasks: Vec<Task> = PROMOTED_TASK_PLAN
            .iter()
            .map(|name| Task::new(self.ids.next_id("task"), *name))
            .collect();

        let directive = Directive {
            id: directive_id.clone(),
            title,
            description: promotion.description,
            category: promotion.category,
            priority: promotion.priority,
            status: DirectiveStatus::Pending,
            deployment_status: DeploymentStatus::None,
            tasks,
            api_key_required: false,
            deployable: true,
        };

        self.directives.add(directive.clone());
        self.mind_map.mark_promoted(node_id, &directive_id);
        self.chronicle.record(
            ChronicleLogType::Directive,
            format!(
                "New directive created: \"{}\" with {} tasks.",
                directive.title,
                directive.tasks.len()
            ),
        );

        Ok(directive)
    }

    /// Check a node can be expanded with generated ideas
    pub fn ideation_target(&self, node_id: &str) -> Result<MindMapNode, Rejection> {
        let node = self
            .mind_map
            .get(node_id)
            .ok_or_else(|| Rejection::UnknownNode(node_id.to_string()))?;
        if node.is_promoted {
            return Err(Rejection::NodeAlreadyPromoted(node_id.to_string()));
        }
        Ok(node.clone())
    }

    /// Attach generated ideas as children of `node_id`
    ///
    /// An empty idea list adds nothing and records nothing.
    pub fn expand_node(&mut self, node_id: &str, ideas: Vec<String>) -> Result<Vec<MindMapNode>, Rejection> {
        self.ideation_target(node_id)?;
        if ideas.is_empty() {
            return Ok(Vec::new());
        }

        let ids = (0..ideas.len()).map(|_| self.ids.next_id("node")).collect();
        let children = self.mind_map.add_children(node_id, ids, ideas);
        self.chronicle.record(
            ChronicleLogType::Agent,
            format!("AI Ideation successful: Generated {} new nodes.", children.len()),
        );
        Ok(children)
    }
}
