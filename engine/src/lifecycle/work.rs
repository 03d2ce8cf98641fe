//! Work units
//!
//! A work unit is whatever actually performs a task once it is in progress.
//! The default [`SimulatedWork`] just waits a random duration; tests plug in
//! units that fail or finish instantly.

use super::WorkOrder;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkError {
    #[error("{0}")]
    Failed(String),
}

/// Performs the work behind a task
#[async_trait]
pub trait WorkUnit: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Run to completion, or report why the task could not be done
    ///
    /// The future may be dropped at any await point when the task is
    /// unassigned or the daemon shuts down.
    async fn execute(&self, order: &WorkOrder) -> Result<(), WorkError>;
}

/// Waits a uniformly random duration in `[min, max)` and succeeds
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    min_ms: u64,
    max_ms: u64,
}

impl SimulatedWork {
    pub fn new(min: Duration, max: Duration) -> Self {
        let min_ms = min.as_millis() as u64;
        let max_ms = (max.as_millis() as u64).max(min_ms + 1);
        Self { min_ms, max_ms }
    }

    fn sample_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..self.max_ms))
    }
}

#[async_trait]
impl WorkUnit for SimulatedWork {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn execute(&self, order: &WorkOrder) -> Result<(), WorkError> {
        let delay = self.sample_delay();
        tracing::debug!(
            task_id = %order.task_id,
            agent_id = %order.agent_id,
            delay_ms = delay.as_millis() as u64,
            "Simulating task work"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}
