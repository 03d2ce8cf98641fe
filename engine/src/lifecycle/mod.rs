//! Task Lifecycle Engine
//!
//! Per-task transitions on [`CommandState`]:
//!
//! ```text
//! pending --assign--> in_progress --complete--> completed
//!    ^                     |
//!    +---unassign / fail---+
//! ```
//!
//! Assigning couples the task to an agent: the agent goes `Executing` on the
//! task's directive, and back to `Idle` when the task completes, fails or is
//! unassigned. A released agent immediately drains its queue.
//!
//! Operations never start work themselves. They return [`WorkOrder`]s and the
//! runtime runs a [`WorkUnit`] for each one.

mod rejection;
pub mod work;

pub use rejection::Rejection;
pub use work::{SimulatedWork, WorkError, WorkUnit};

use crate::state::CommandState;
use crate::store::DirectivePatch;
use sdk::types::{AgentStatus, ChronicleLogType, DeploymentStatus, DirectiveStatus, TaskStatus};

/// A task that was just put in progress and needs a work unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    pub directive_id: String,
    pub task_id: String,
    pub agent_id: String,
}

/// Side effects of a lifecycle operation
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Transition {
    /// Work to start, e.g. queued tasks picked up by a released agent
    pub started: Vec<WorkOrder>,
    /// Review opened because the directive's plan finished
    pub review_opened: Option<String>,
}

impl CommandState {
    /// Put a pending task in progress on an idle agent
    pub fn assign_agent(&mut self, directive_id: &str, task_id: &str, agent_id: &str) -> Result<WorkOrder, Rejection> {
        let directive = self
            .directives
            .get(directive_id)
            .ok_or_else(|| Rejection::UnknownDirective(directive_id.to_string()))?;
        let task = directive
            .task(task_id)
            .ok_or_else(|| Rejection::UnknownTask(task_id.to_string()))?;
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| Rejection::UnknownAgent(agent_id.to_string()))?;

        if task.status != TaskStatus::Pending {
            return Err(Rejection::TaskNotPending {
                task_id: task_id.to_string(),
                status: task.status,
            });
        }
        match agent.status {
            AgentStatus::Idle => {}
            AgentStatus::Executing => return Err(Rejection::AgentBusy(agent_id.to_string())),
            status => {
                return Err(Rejection::AgentUnavailable {
                    agent_id: agent_id.to_string(),
                    status,
                })
            }
        }

        let message = format!(
            "{} started task \"{}\" for directive \"{}\".",
            agent.name, task.name, directive.title
        );

        if let Some(task) = self
            .directives
            .get_mut(directive_id)
            .and_then(|d| d.task_mut(task_id))
        {
            task.status = TaskStatus::InProgress;
            task.assigned_agent_id = Some(agent_id.to_string());
        }
        self.agents
            .set_status(agent_id, AgentStatus::Executing, Some(directive_id.to_string()));
        self.chronicle.record(ChronicleLogType::Agent, message);

        Ok(WorkOrder {
            directive_id: directive_id.to_string(),
            task_id: task_id.to_string(),
            agent_id: agent_id.to_string(),
        })
    }

    /// Mark an in-progress task completed and release its agent
    pub fn complete_task(&mut self, directive_id: &str, task_id: &str) -> Result<Transition, Rejection> {
        let agent_id = self.take_in_progress(directive_id, task_id, TaskStatus::Completed)?;

        let task_name = self.task_name(directive_id, task_id);
        self.chronicle
            .record(ChronicleLogType::Agent, format!("Task \"{}\" completed.", task_name));

        let review_opened = self.evaluate_review(directive_id);
        let started = match agent_id {
            Some(agent_id) => self.release_agent(&agent_id),
            None => Vec::new(),
        };

        Ok(Transition {
            started,
            review_opened,
        })
    }

    /// Operator undo: return an in-progress task to pending
    pub fn unassign_task(&mut self, directive_id: &str, task_id: &str) -> Result<Transition, Rejection> {
        let agent_id = self.take_in_progress(directive_id, task_id, TaskStatus::Pending)?;

        let task_name = self.task_name(directive_id, task_id);
        let agent_name = agent_id
            .as_deref()
            .and_then(|id| self.agents.get(id))
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown agent".to_string());
        self.chronicle.record(
            ChronicleLogType::Agent,
            format!("{} unassigned from task \"{}\".", agent_name, task_name),
        );

        let started = match agent_id {
            Some(agent_id) => self.release_agent(&agent_id),
            None => Vec::new(),
        };

        Ok(Transition {
            started,
            review_opened: None,
        })
    }

    /// A work unit reported failure: return the task to pending
    ///
    /// The agent is released like on completion, so its queue keeps moving.
    pub fn fail_task(&mut self, directive_id: &str, task_id: &str, reason: &str) -> Result<Transition, Rejection> {
        let agent_id = self.take_in_progress(directive_id, task_id, TaskStatus::Pending)?;

        let task_name = self.task_name(directive_id, task_id);
        self.chronicle.record(
            ChronicleLogType::Anomaly,
            format!("Task \"{}\" failed: {}. Returned to pending.", task_name, reason),
        );

        let started = match agent_id {
            Some(agent_id) => self.release_agent(&agent_id),
            None => Vec::new(),
        };

        Ok(Transition {
            started,
            review_opened: None,
        })
    }

    /// Queue a pending task for an agent
    ///
    /// An idle agent with nothing queued starts the task at once and the
    /// returned order must be run.
    pub fn enqueue_task(&mut self, agent_id: &str, task_id: &str) -> Result<Option<WorkOrder>, Rejection> {
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| Rejection::UnknownAgent(agent_id.to_string()))?;
        let directive_id = self
            .directives
            .find_task(task_id)
            .ok_or_else(|| Rejection::UnknownTask(task_id.to_string()))?
            .to_string();
        let task = self
            .directives
            .get(&directive_id)
            .and_then(|d| d.task(task_id))
            .ok_or_else(|| Rejection::UnknownTask(task_id.to_string()))?;

        if task.status != TaskStatus::Pending {
            return Err(Rejection::TaskNotPending {
                task_id: task_id.to_string(),
                status: task.status,
            });
        }
        if self.agents.is_queued(task_id) {
            return Err(Rejection::AlreadyQueued(task_id.to_string()));
        }

        let status = agent.status;
        let queue_empty = agent.task_queue.is_empty();
        let message = format!("Task \"{}\" queued for {}.", task.name, agent.name);

        match status {
            AgentStatus::Idle if queue_empty => {
                self.assign_agent(&directive_id, task_id, agent_id).map(Some)
            }
            AgentStatus::Idle | AgentStatus::Executing => {
                self.agents.enqueue(agent_id, task_id);
                self.chronicle.record(ChronicleLogType::Agent, message);
                Ok(None)
            }
            status => Err(Rejection::AgentUnavailable {
                agent_id: agent_id.to_string(),
                status,
            }),
        }
    }

    /// Move an in-progress task to `next`, returning the agent it held
    fn take_in_progress(&mut self, directive_id: &str, task_id: &str, next: TaskStatus) -> Result<Option<String>, Rejection> {
        let directive = self
            .directives
            .get_mut(directive_id)
            .ok_or_else(|| Rejection::UnknownDirective(directive_id.to_string()))?;
        let task = directive
            .task_mut(task_id)
            .ok_or_else(|| Rejection::UnknownTask(task_id.to_string()))?;

        if task.status != TaskStatus::InProgress {
            return Err(Rejection::TaskNotInProgress {
                task_id: task_id.to_string(),
                status: task.status,
            });
        }

        task.status = next;
        let agent_id = if next == TaskStatus::Completed {
            task.assigned_agent_id.clone()
        } else {
            task.assigned_agent_id.take()
        };

        Ok(agent_id)
    }

    fn task_name(&self, directive_id: &str, task_id: &str) -> String {
        self.directives
            .get(directive_id)
            .and_then(|d| d.task(task_id))
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    /// Set an agent Idle and start the first still-pending task in its queue
    fn release_agent(&mut self, agent_id: &str) -> Vec<WorkOrder> {
        self.agents.set_status(agent_id, AgentStatus::Idle, None);

        while let Some(task_id) = self.agents.dequeue_next(agent_id) {
            let Some(directive_id) = self.directives.find_task(&task_id).map(str::to_string) else {
                tracing::warn!(agent_id = %agent_id, task_id = %task_id, "Dropping queued task with no directive");
                continue;
            };

            match self.assign_agent(&directive_id, &task_id, agent_id) {
                Ok(order) => return vec![order],
                Err(rejection) => {
                    tracing::debug!(
                        agent_id = %agent_id,
                        task_id = %task_id,
                        reason = rejection.reason(),
                        "Skipping queued task"
                    );
                }
            }
        }

        Vec::new()
    }

    /// Open the review once every task of the directive is completed
    ///
    /// Only fires while the deployment status is still `none`, so a directive
    /// enters review at most once.
    fn evaluate_review(&mut self, directive_id: &str) -> Option<String> {
        let directive = self.directives.get(directive_id)?;
        if directive.deployment_status != DeploymentStatus::None || !directive.all_tasks_completed() {
            return None;
        }
        let title = directive.title.clone();

        self.directives.update(
            directive_id,
            DirectivePatch {
                status: Some(DirectiveStatus::Completed),
                deployment_status: Some(DeploymentStatus::InReview),
                ..Default::default()
            },
        );
        let review_id = self.reviews.open_for(directive_id, &title);
        self.chronicle.record(
            ChronicleLogType::Directive,
            format!(
                "All tasks for \"{}\" completed. Now awaiting deployment approval.",
                title
            ),
        );

        Some(review_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthMonitor;
    use sdk::types::{Agent, Directive, DirectiveCategory, DirectivePriority, Task};

    fn state() -> CommandState {
        let mut state = CommandState::new(HealthMonitor::new(99.8, 85.0));
        state.directives.add(Directive {
            id: "d-1".to_string(),
            title: "Build".to_string(),
            description: "desc".to_string(),
            category: DirectiveCategory::Standard,
            priority: DirectivePriority::High,
            status: DirectiveStatus::Pending,
            deployment_status: DeploymentStatus::None,
            tasks: vec![Task::new("t-1", "First"), Task::new("t-2", "Second")],
            api_key_required: false,
            deployable: true,
        });
        state.agents.register(Agent::new("a-1", "Alpha", "work"));
        state.agents.register(Agent::new("a-2", "Beta", "work"));
        state
    }

    fn task_status(state: &CommandState, task_id: &str) -> TaskStatus {
        state.directives.get("d-1").unwrap().task(task_id).unwrap().status
    }

    #[test]
    fn test_assign_marks_task_and_agent() {
        let mut state = state();
        let order = state.assign_agent("d-1", "t-1", "a-1").unwrap();

        assert_eq!(order.agent_id, "a-1");
        let task = state.directives.get("d-1").unwrap().task("t-1").unwrap().clone();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assigned_agent_id.as_deref(), Some("a-1"));

        let agent = state.agents.get("a-1").unwrap();
        assert_eq!(agent.status, AgentStatus::Executing);
        assert_eq!(agent.current_task_directive_id.as_deref(), Some("d-1"));
        assert_eq!(
            state.chronicle.latest().unwrap().message,
            "Alpha started task \"First\" for directive \"Build\"."
        );
    }

    #[test]
    fn test_assign_to_busy_agent_rejected() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        let chronicle_len = state.chronicle.len();

        let err = state.assign_agent("d-1", "t-2", "a-1").unwrap_err();
        assert_eq!(err, Rejection::AgentBusy("a-1".to_string()));
        assert_eq!(task_status(&state, "t-2"), TaskStatus::Pending);
        assert_eq!(state.chronicle.len(), chronicle_len);
    }

    #[test]
    fn test_assign_unknown_entities() {
        let mut state = state();
        assert!(matches!(
            state.assign_agent("nope", "t-1", "a-1"),
            Err(Rejection::UnknownDirective(_))
        ));
        assert!(matches!(
            state.assign_agent("d-1", "nope", "a-1"),
            Err(Rejection::UnknownTask(_))
        ));
        assert!(matches!(
            state.assign_agent("d-1", "t-1", "nope"),
            Err(Rejection::UnknownAgent(_))
        ));
    }

    #[test]
    fn test_assign_unavailable_agent() {
        let mut state = state();
        state.agents.set_status("a-1", AgentStatus::Training, None);
        assert!(matches!(
            state.assign_agent("d-1", "t-1", "a-1"),
            Err(Rejection::AgentUnavailable { .. })
        ));
    }

    #[test]
    fn test_complete_releases_agent() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        let transition = state.complete_task("d-1", "t-1").unwrap();

        assert!(transition.started.is_empty());
        assert!(transition.review_opened.is_none());
        assert_eq!(task_status(&state, "t-1"), TaskStatus::Completed);

        let agent = state.agents.get("a-1").unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(agent.current_task_directive_id.is_none());
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let mut state = state();
        assert!(matches!(
            state.complete_task("d-1", "t-1"),
            Err(Rejection::TaskNotInProgress { .. })
        ));
    }

    #[test]
    fn test_review_opened_once_all_tasks_complete() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        state.assign_agent("d-1", "t-2", "a-2").unwrap();
        state.complete_task("d-1", "t-1").unwrap();
        let transition = state.complete_task("d-1", "t-2").unwrap();

        assert_eq!(transition.review_opened.as_deref(), Some("pr-d-1"));
        let directive = state.directives.get("d-1").unwrap();
        assert_eq!(directive.deployment_status, DeploymentStatus::InReview);
        assert_eq!(directive.status, DirectiveStatus::Completed);
        assert_eq!(state.reviews.list().len(), 1);
        assert_eq!(state.agents.get("a-1").unwrap().status, AgentStatus::Idle);
        assert_eq!(state.agents.get("a-2").unwrap().status, AgentStatus::Idle);
    }

    #[test]
    fn test_unassign_returns_task_to_pending() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        state.unassign_task("d-1", "t-1").unwrap();

        let task = state.directives.get("d-1").unwrap().task("t-1").unwrap().clone();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.assigned_agent_id.is_none());
        assert_eq!(state.agents.get("a-1").unwrap().status, AgentStatus::Idle);
        assert!(state.complete_task("d-1", "t-1").is_err());
    }

    #[test]
    fn test_fail_task_chronicles_anomaly() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        state.fail_task("d-1", "t-1", "worker crashed").unwrap();

        assert_eq!(task_status(&state, "t-1"), TaskStatus::Pending);
        let latest = state.chronicle.latest().unwrap();
        assert_eq!(latest.kind, ChronicleLogType::Anomaly);
        assert_eq!(
            latest.message,
            "Task \"First\" failed: worker crashed. Returned to pending."
        );
    }

    #[test]
    fn test_failed_task_releases_agent_to_its_queue() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        state.enqueue_task("a-1", "t-2").unwrap();

        let transition = state.fail_task("d-1", "t-1", "worker crashed").unwrap();

        assert_eq!(task_status(&state, "t-1"), TaskStatus::Pending);
        assert!(state.directives.get("d-1").unwrap().task("t-1").unwrap().assigned_agent_id.is_none());
        assert_eq!(transition.started.len(), 1);
        assert_eq!(transition.started[0].task_id, "t-2");
        assert_eq!(task_status(&state, "t-2"), TaskStatus::InProgress);

        let agent = state.agents.get("a-1").unwrap();
        assert_eq!(agent.status, AgentStatus::Executing);
        assert!(agent.task_queue.is_empty());
    }

    #[test]
    fn test_enqueue_on_idle_agent_starts_immediately() {
        let mut state = state();
        let order = state.enqueue_task("a-1", "t-1").unwrap();

        assert_eq!(order.unwrap().task_id, "t-1");
        assert_eq!(task_status(&state, "t-1"), TaskStatus::InProgress);
    }

    #[test]
    fn test_queue_drained_on_completion() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        assert!(state.enqueue_task("a-1", "t-2").unwrap().is_none());
        assert_eq!(
            state.enqueue_task("a-2", "t-2"),
            Err(Rejection::AlreadyQueued("t-2".to_string()))
        );

        let transition = state.complete_task("d-1", "t-1").unwrap();
        assert_eq!(
            transition.started,
            vec![WorkOrder {
                directive_id: "d-1".to_string(),
                task_id: "t-2".to_string(),
                agent_id: "a-1".to_string(),
            }]
        );
        assert_eq!(task_status(&state, "t-2"), TaskStatus::InProgress);
        assert_eq!(state.agents.get("a-1").unwrap().status, AgentStatus::Executing);
    }

    #[test]
    fn test_queue_skips_tasks_no_longer_pending() {
        let mut state = state();
        state.assign_agent("d-1", "t-1", "a-1").unwrap();
        state.enqueue_task("a-1", "t-2").unwrap();
        // Someone else picked t-2 up in the meantime
        state.assign_agent("d-1", "t-2", "a-2").unwrap();

        let transition = state.complete_task("d-1", "t-1").unwrap();
        assert!(transition.started.is_empty());

        let agent = state.agents.get("a-1").unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(agent.task_queue.is_empty());
    }
}
