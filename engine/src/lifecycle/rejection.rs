use sdk::errors::EngineError;
use sdk::types::{AgentStatus, DeploymentStatus, ReviewStatus, TaskStatus};
use thiserror::Error;

/// Why a command was refused
///
/// A rejected command leaves every store untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Directive {0} not found")]
    UnknownDirective(String),

    #[error("Task {0} not found")]
    UnknownTask(String),

    #[error("Agent {0} not found")]
    UnknownAgent(String),

    #[error("Review {0} not found")]
    UnknownReview(String),

    #[error("Compliance alert {0} not found")]
    UnknownAlert(String),

    #[error("Mind map node {0} not found")]
    UnknownNode(String),

    #[error("Task {task_id} is {status}, expected pending")]
    TaskNotPending { task_id: String, status: TaskStatus },

    #[error("Task {task_id} is {status}, expected in_progress")]
    TaskNotInProgress { task_id: String, status: TaskStatus },

    #[error("Task {0} is already queued")]
    AlreadyQueued(String),

    #[error("Agent {0} is already executing a task")]
    AgentBusy(String),

    #[error("Agent {agent_id} is {status} and cannot take tasks")]
    AgentUnavailable { agent_id: String, status: AgentStatus },

    #[error("Review {review_id} is {status:?}")]
    ReviewNotOpen { review_id: String, status: ReviewStatus },

    #[error("Review {review_id} does not belong to directive {directive_id}")]
    ReviewMismatch { review_id: String, directive_id: String },

    #[error("Review {0} is not linked to a directive")]
    ReviewWithoutDirective(String),

    #[error("Directive {directive_id} is {status}, not awaiting deployment")]
    NotAwaitingDeployment {
        directive_id: String,
        status: DeploymentStatus,
    },

    #[error("Directive {0} is already deploying")]
    DeploymentActive(String),

    #[error("Mind map node {0} is already promoted")]
    NodeAlreadyPromoted(String),
}

impl Rejection {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownDirective(_) => "unknown_directive",
            Self::UnknownTask(_) => "unknown_task",
            Self::UnknownAgent(_) => "unknown_agent",
            Self::UnknownReview(_) => "unknown_review",
            Self::UnknownAlert(_) => "unknown_alert",
            Self::UnknownNode(_) => "unknown_node",
            Self::TaskNotPending { .. } => "task_not_pending",
            Self::TaskNotInProgress { .. } => "task_not_in_progress",
            Self::AlreadyQueued(_) => "already_queued",
            Self::AgentBusy(_) => "agent_busy",
            Self::AgentUnavailable { .. } => "agent_unavailable",
            Self::ReviewNotOpen { .. } => "review_not_open",
            Self::ReviewMismatch { .. } => "review_mismatch",
            Self::ReviewWithoutDirective(_) => "review_without_directive",
            Self::NotAwaitingDeployment { .. } => "not_awaiting_deployment",
            Self::DeploymentActive(_) => "deployment_active",
            Self::NodeAlreadyPromoted(_) => "node_already_promoted",
        }
    }

    /// Whether the command referenced something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownDirective(_)
                | Self::UnknownTask(_)
                | Self::UnknownAgent(_)
                | Self::UnknownReview(_)
                | Self::UnknownAlert(_)
                | Self::UnknownNode(_)
        )
    }
}

impl From<Rejection> for EngineError {
    fn from(rejection: Rejection) -> Self {
        if rejection.is_not_found() {
            EngineError::NotFound(rejection.to_string())
        } else {
            EngineError::InvalidTransition(rejection.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Rejection::UnknownAgent("a".to_string()).is_not_found());
        assert!(!Rejection::AgentBusy("a".to_string()).is_not_found());
    }

    #[test]
    fn test_message_and_reason() {
        let rejection = Rejection::TaskNotPending {
            task_id: "t-1".to_string(),
            status: TaskStatus::Completed,
        };
        assert_eq!(rejection.to_string(), "Task t-1 is completed, expected pending");
        assert_eq!(rejection.reason(), "task_not_pending");
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: EngineError = Rejection::UnknownDirective("d".to_string()).into();
        assert!(matches!(err, EngineError::NotFound(_)));

        let err: EngineError = Rejection::DeploymentActive("d".to_string()).into();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
    }
}
