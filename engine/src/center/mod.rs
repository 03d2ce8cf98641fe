//! Command Center runtime
//!
//! Wraps [`CommandState`] for concurrent use. One std mutex guards the state
//! together with the handles of every running work unit and deployment, so
//! a lifecycle transition and the bookkeeping of the async work it starts or
//! cancels happen atomically. The lock is never held across an await.
//!
//! # Work tickets
//!
//! Each started work unit gets a ticket. When a unit finishes it only
//! applies its outcome if its ticket is still the current one for the task;
//! a unit whose task was unassigned (and maybe reassigned) in the meantime
//! is discarded.

use crate::compliance::ComplianceScanner;
use crate::config::Config;
use crate::deployment::{DeployError, Deployer, DeploymentOrder, SimulatedDeployer};
use crate::health::{HealthEvent, HealthMonitor};
use crate::lifecycle::{Rejection, SimulatedWork, WorkError, WorkOrder, WorkUnit};
use crate::state::{CommandState, Promotion, StateSnapshot};
use sdk::types::{
    AiService, ChronicleLog, ChronicleLogType, ComplianceAlert, Directive, KnowledgeFile,
    KnowledgeFileType, MindMapNode, Position, ReviewStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

struct InFlight {
    ticket: u64,
    handle: JoinHandle<()>,
}

struct Shared {
    state: CommandState,
    work: HashMap<String, InFlight>,
    deployments: HashMap<String, JoinHandle<()>>,
}

struct Inner {
    shared: Mutex<Shared>,
    worker: Arc<dyn WorkUnit>,
    deployer: Arc<dyn Deployer>,
    scanner: ComplianceScanner,
    tickets: AtomicU64,
}

/// Shared handle to the command center
#[derive(Clone)]
pub struct CommandCenter {
    inner: Arc<Inner>,
}

impl CommandCenter {
    pub fn new(
        state: CommandState,
        worker: Arc<dyn WorkUnit>,
        deployer: Arc<dyn Deployer>,
        scanner: ComplianceScanner,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    state,
                    work: HashMap::new(),
                    deployments: HashMap::new(),
                }),
                worker,
                deployer,
                scanner,
                tickets: AtomicU64::new(1),
            }),
        }
    }

    /// Build a seeded command center with simulated work and deployments
    pub fn from_config(config: &Config) -> Self {
        let health = HealthMonitor::new(config.health.initial, config.health.threshold);
        let (min, max) = config.simulation.work_window();

        Self::new(
            CommandState::seeded(health),
            Arc::new(SimulatedWork::new(min, max)),
            Arc::new(SimulatedDeployer::new(config.simulation.deploy_delay())),
            ComplianceScanner::new(config.compliance.keywords.clone()),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure against the state
    pub fn read<R>(&self, f: impl FnOnce(&CommandState) -> R) -> R {
        f(&self.lock().state)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.read(|state| state.snapshot())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChronicleLog> {
        self.read(|state| state.chronicle.subscribe())
    }

    pub fn record(&self, kind: ChronicleLogType, message: impl Into<String>) -> ChronicleLog {
        self.lock().state.record(kind, message)
    }

    /// Number of work units currently running
    pub fn active_work(&self) -> usize {
        self.lock().work.len()
    }

    // ---- Task lifecycle ----

    pub fn assign(&self, directive_id: &str, task_id: &str, agent_id: &str) -> Result<WorkOrder, Rejection> {
        let mut shared = self.lock();
        let order = shared.state.assign_agent(directive_id, task_id, agent_id)?;
        self.spawn_work(&mut shared, order.clone());
        Ok(order)
    }

    /// Return an in-progress task to pending and cancel its work unit
    pub fn unassign(&self, directive_id: &str, task_id: &str) -> Result<(), Rejection> {
        let mut shared = self.lock();
        let transition = shared.state.unassign_task(directive_id, task_id)?;

        if let Some(flight) = shared.work.remove(task_id) {
            flight.handle.abort();
            tracing::debug!(task_id = %task_id, ticket = flight.ticket, "Aborted work unit");
        }
        for order in transition.started {
            self.spawn_work(&mut shared, order);
        }
        Ok(())
    }

    pub fn enqueue(&self, agent_id: &str, task_id: &str) -> Result<Option<WorkOrder>, Rejection> {
        let mut shared = self.lock();
        let order = shared.state.enqueue_task(agent_id, task_id)?;
        if let Some(order) = &order {
            self.spawn_work(&mut shared, order.clone());
        }
        Ok(order)
    }

    fn spawn_work(&self, shared: &mut Shared, order: WorkOrder) {
        let ticket = self.inner.tickets.fetch_add(1, Ordering::Relaxed);
        let center = self.clone();
        let worker = Arc::clone(&self.inner.worker);
        let task_id = order.task_id.clone();

        tracing::debug!(task_id = %task_id, worker = worker.name(), ticket, "Starting work unit");

        let handle = tokio::spawn(async move {
            let outcome = worker.execute(&order).await;
            center.finish_work(order, ticket, outcome);
        });

        if let Some(stale) = shared.work.insert(task_id, InFlight { ticket, handle }) {
            stale.handle.abort();
        }
    }

    fn finish_work(&self, order: WorkOrder, ticket: u64, outcome: Result<(), WorkError>) {
        let mut shared = self.lock();

        let current = shared.work.get(&order.task_id).map(|f| f.ticket) == Some(ticket);
        if !current {
            tracing::debug!(task_id = %order.task_id, ticket, "Discarding stale work outcome");
            return;
        }
        shared.work.remove(&order.task_id);

        let result = match outcome {
            Ok(()) => shared.state.complete_task(&order.directive_id, &order.task_id),
            Err(err) => shared
                .state
                .fail_task(&order.directive_id, &order.task_id, &err.to_string()),
        };

        match result {
            Ok(transition) => {
                if let Some(review_id) = transition.review_opened {
                    tracing::info!(directive_id = %order.directive_id, review_id = %review_id, "Directive ready for review");
                }
                for next in transition.started {
                    self.spawn_work(&mut shared, next);
                }
            }
            Err(rejection) => {
                tracing::warn!(task_id = %order.task_id, "Work outcome rejected: {}", rejection);
            }
        }
    }

    // ---- Deployment ----

    /// Approve a review; the directive defaults to the one the review belongs to
    pub fn approve(&self, review_id: &str, directive_id: Option<&str>) -> Result<DeploymentOrder, Rejection> {
        let mut shared = self.lock();

        let directive_id = match directive_id {
            Some(id) => id.to_string(),
            None => {
                let review = shared
                    .state
                    .reviews
                    .get(review_id)
                    .ok_or_else(|| Rejection::UnknownReview(review_id.to_string()))?;
                match (&review.directive_id, review.status) {
                    (Some(id), _) => id.clone(),
                    (None, ReviewStatus::Merged) => {
                        return Err(Rejection::ReviewNotOpen {
                            review_id: review_id.to_string(),
                            status: review.status,
                        })
                    }
                    (None, _) => return Err(Rejection::ReviewWithoutDirective(review_id.to_string())),
                }
            }
        };

        let order = shared.state.approve_review(review_id, &directive_id)?;

        let center = self.clone();
        let deployer = Arc::clone(&self.inner.deployer);
        let spawned = order.clone();
        let handle = tokio::spawn(async move {
            let outcome = deployer.deploy(&spawned).await;
            center.finish_deployment(spawned, outcome);
        });
        shared.deployments.insert(directive_id, handle);

        Ok(order)
    }

    fn finish_deployment(&self, order: DeploymentOrder, outcome: Result<(), DeployError>) {
        let mut shared = self.lock();
        shared.deployments.remove(&order.directive_id);
        shared.state.finish_deployment(&order, outcome);
    }

    // ---- Compliance & health ----

    pub fn run_compliance_scan(&self) -> Vec<ComplianceAlert> {
        let mut shared = self.lock();
        shared.state.run_compliance_scan(&self.inner.scanner)
    }

    pub fn acknowledge_alert(&self, alert_id: &str) -> Result<ComplianceAlert, Rejection> {
        self.lock().state.acknowledge_alert(alert_id)
    }

    /// Advance system health with a fresh random sample
    pub fn tick_health(&self) -> Option<HealthEvent> {
        self.lock().state.tick_health(&mut rand::thread_rng())
    }

    // ---- Knowledge base & mind map ----

    pub fn register_knowledge(&self, name: &str, kind: KnowledgeFileType) -> KnowledgeFile {
        self.lock().state.register_knowledge(name, kind)
    }

    pub fn add_node(
        &self,
        label: &str,
        parent_id: Option<String>,
        position: Position,
        ai_service: Option<AiService>,
    ) -> Result<MindMapNode, Rejection> {
        self.lock()
            .state
            .add_mind_map_node(label, parent_id, position, ai_service)
    }

    pub fn promote_node(&self, node_id: &str, promotion: Promotion) -> Result<Directive, Rejection> {
        self.lock().state.promote_node(node_id, promotion)
    }

    pub fn ideation_target(&self, node_id: &str) -> Result<MindMapNode, Rejection> {
        self.read(|state| state.ideation_target(node_id))
    }

    pub fn expand_node(&self, node_id: &str, ideas: Vec<String>) -> Result<Vec<MindMapNode>, Rejection> {
        self.lock().state.expand_node(node_id, ideas)
    }

    /// Abort every running work unit and deployment
    pub fn shutdown(&self) {
        let mut shared = self.lock();
        let work = shared.work.len();
        let deployments = shared.deployments.len();

        for (_, flight) in shared.work.drain() {
            flight.handle.abort();
        }
        for (_, handle) in shared.deployments.drain() {
            handle.abort();
        }

        tracing::info!(work, deployments, "Command center stopped");
    }
}
