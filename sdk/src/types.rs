//! Command center domain types
//!
//! Every type serializes to the camelCase JSON shape the dashboard client
//! consumes, so the enums carry explicit wire names.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Directive category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveCategory {
    Priority,
    Standard,
    Visionary,
}

/// Directive priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DirectivePriority {
    High,
    Medium,
    Low,
}

/// Directive completion status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveStatus {
    #[default]
    Pending,
    Completed,
}

/// Deployment status of a directive
///
/// Progression is `None -> InReview -> InProgress -> Deployed`. A directive
/// never moves backwards along this order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    #[default]
    None,
    InProgress,
    InReview,
    Deployed,
}

impl DeploymentStatus {
    /// Position along the deployment progression
    pub fn rank(self) -> u8 {
        match self {
            DeploymentStatus::None => 0,
            DeploymentStatus::InReview => 1,
            DeploymentStatus::InProgress => 2,
            DeploymentStatus::Deployed => 3,
        }
    }

    /// Whether moving to `next` keeps the progression monotonic
    pub fn can_advance_to(self, next: DeploymentStatus) -> bool {
        next.rank() >= self.rank()
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeploymentStatus::None => "none",
            DeploymentStatus::InProgress => "in_progress",
            DeploymentStatus::InReview => "in_review",
            DeploymentStatus::Deployed => "deployed",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step in a directive's execution plan
///
/// `assigned_agent_id` is only set while the task is in progress or after
/// it completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<String>,
}

impl Task {
    /// Create a new pending, unassigned task
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: TaskStatus::Pending,
            assigned_agent_id: None,
        }
    }
}

/// A unit of work with a task plan and a deployment lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: DirectiveCategory,
    pub priority: DirectivePriority,
    #[serde(default)]
    pub status: DirectiveStatus,
    #[serde(default)]
    pub deployment_status: DeploymentStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub api_key_required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deployable: bool,
}

impl Directive {
    /// Whether the directive has tasks and every one of them is completed
    pub fn all_tasks_completed(&self) -> bool {
        !self.tasks.is_empty()
            && self
                .tasks
                .iter()
                .all(|t| t.status == TaskStatus::Completed)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

/// Agent status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgentStatus {
    Idle,
    Executing,
    Training,
    Error,
    SystemGuardian,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Idle => "Idle",
            AgentStatus::Executing => "Executing",
            AgentStatus::Training => "Training",
            AgentStatus::Error => "Error",
            AgentStatus::SystemGuardian => "SystemGuardian",
        };
        f.write_str(s)
    }
}

/// A named worker with a status and a FIFO queue of task ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub objective: String,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_directive_id: Option<String>,
    #[serde(default)]
    pub task_queue: VecDeque<String>,
}

impl Agent {
    /// Create an idle agent with an empty queue
    pub fn new(id: impl Into<String>, name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            objective: objective.into(),
            status: AgentStatus::Idle,
            current_task_directive_id: None,
            task_queue: VecDeque::new(),
        }
    }
}

/// Category of a chronicle entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChronicleLogType {
    System,
    Directive,
    Agent,
    Anomaly,
}

/// One chronicle entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChronicleLog {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: ChronicleLogType,
    pub message: String,
}

/// A potential policy violation found by the compliance scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceAlert {
    pub id: String,
    pub location: String,
    pub issue: String,
    pub timestamp: String,
}

/// Code review status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewStatus {
    Open,
    Merged,
    Closed,
}

/// Review item opened when a directive's tasks are all completed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeReviewItem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive_id: Option<String>,
}

/// Knowledge base document kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum KnowledgeFileType {
    Doc,
    Pdf,
    Sheet,
    Slide,
}

/// Vector embedding progress of a knowledge file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EmbeddingStatus {
    #[default]
    Pending,
    #[serde(rename = "Embedding...")]
    Embedding,
    Indexed,
}

/// A document registered in the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeFileType,
    #[serde(default)]
    pub embedding_status: EmbeddingStatus,
}

/// External AI service a mind-map node can be wired to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiService {
    Gemini,
    Grok,
    Copilot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Mind-map ideation node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MindMapNode {
    pub id: String,
    pub label: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_service: Option<AiService>,
}
