//! Agent Store
//!
//! Agents keep their registration order. Every status change goes through
//! [`AgentStore::set_status`], which keeps `Executing` and
//! `current_task_directive_id` in lockstep.

use sdk::types::{Agent, AgentStatus};

#[derive(Debug, Default)]
pub struct AgentStore {
    agents: Vec<Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, replacing any agent with the same id
    pub fn register(&mut self, agent: Agent) {
        match self.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn list(&self) -> &[Agent] {
        &self.agents
    }

    /// Set an agent's status and current directive in one update
    ///
    /// `Executing` requires a directive id; a request without one leaves the
    /// agent untouched. Any other status clears the directive reference.
    ///
    /// # Returns
    /// `true` if the agent exists and the update was applied
    pub fn set_status(&mut self, agent_id: &str, status: AgentStatus, directive_id: Option<String>) -> bool {
        let Some(agent) = self.get_mut(agent_id) else {
            return false;
        };

        match (status, directive_id) {
            (AgentStatus::Executing, Some(directive_id)) => {
                agent.status = AgentStatus::Executing;
                agent.current_task_directive_id = Some(directive_id);
            }
            (AgentStatus::Executing, None) => {
                tracing::warn!(agent_id = %agent_id, "Executing status requires a directive");
                return false;
            }
            (status, _) => {
                agent.status = status;
                agent.current_task_directive_id = None;
            }
        }

        true
    }

    /// Append a task id to the agent's queue
    pub fn enqueue(&mut self, agent_id: &str, task_id: impl Into<String>) -> bool {
        match self.get_mut(agent_id) {
            Some(agent) => {
                agent.task_queue.push_back(task_id.into());
                true
            }
            None => false,
        }
    }

    /// Pop the next queued task id
    ///
    /// An empty queue releases the agent: it becomes `Idle` and its
    /// directive reference is cleared.
    pub fn dequeue_next(&mut self, agent_id: &str) -> Option<String> {
        let agent = self.get_mut(agent_id)?;
        match agent.task_queue.pop_front() {
            Some(task_id) => Some(task_id),
            None => {
                agent.status = AgentStatus::Idle;
                agent.current_task_directive_id = None;
                None
            }
        }
    }

    /// Whether any agent already has `task_id` queued
    pub fn is_queued(&self, task_id: &str) -> bool {
        self.agents
            .iter()
            .any(|a| a.task_queue.iter().any(|t| t == task_id))
    }
}
