//! End-to-end directive lifecycle through the command center runtime
//!
//! Timers are paused, so simulated work and deployments complete as soon as
//! the test advances the clock.

use async_trait::async_trait;
use dlx_engine::center::CommandCenter;
use dlx_engine::compliance::{staging_alert_id, ComplianceScanner};
use dlx_engine::deployment::{DeployError, Deployer, DeploymentOrder};
use dlx_engine::health::HealthMonitor;
use dlx_engine::lifecycle::{Rejection, SimulatedWork};
use dlx_engine::state::CommandState;
use sdk::types::{AgentStatus, ChronicleLogType, DeploymentStatus, ReviewStatus, TaskStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fails the first `failures` deployments, then succeeds
struct FlakyDeployer {
    failures: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl Deployer for FlakyDeployer {
    async fn deploy(&self, _order: &DeploymentOrder) -> Result<(), DeployError> {
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            Err(DeployError::Failed("staging unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn center(failures: usize) -> CommandCenter {
    CommandCenter::new(
        CommandState::seeded(HealthMonitor::new(99.8, 85.0)),
        Arc::new(SimulatedWork::new(
            Duration::from_millis(3000),
            Duration::from_millis(5000),
        )),
        Arc::new(FlakyDeployer {
            failures,
            attempts: AtomicUsize::new(0),
        }),
        ComplianceScanner::new(vec!["anomalies".to_string()]),
    )
}

fn deployment_status(center: &CommandCenter) -> DeploymentStatus {
    center.read(|s| s.directives.get("self-healing").unwrap().deployment_status)
}

async fn complete_self_healing(center: &CommandCenter) {
    center.assign("self-healing", "sh-1", "aura-main").unwrap();
    center.assign("self-healing", "sh-2", "gui-architect").unwrap();
    tokio::time::sleep(Duration::from_millis(5001)).await;
}

#[tokio::test(start_paused = true)]
async fn test_two_agents_finish_directive() {
    let center = center(0);
    complete_self_healing(&center).await;

    center.read(|s| {
        let directive = s.directives.get("self-healing").unwrap();
        assert!(directive.tasks.iter().all(|t| t.status == TaskStatus::Completed));
        assert_eq!(directive.deployment_status, DeploymentStatus::InReview);

        for id in ["aura-main", "gui-architect"] {
            let agent = s.agents.get(id).unwrap();
            assert_eq!(agent.status, AgentStatus::Idle);
            assert!(agent.current_task_directive_id.is_none());
        }

        let review = s.reviews.get("pr-self-healing").unwrap();
        assert_eq!(review.status, ReviewStatus::Open);
        assert_eq!(review.title, "feat: Implement \"Automated Self-Healing\"");
    });
}

#[tokio::test(start_paused = true)]
async fn test_deployed_directive_is_scanned() {
    let center = center(0);
    complete_self_healing(&center).await;

    assert!(center.run_compliance_scan().is_empty());

    center.approve("pr-self-healing", Some("self-healing")).unwrap();
    assert_eq!(deployment_status(&center), DeploymentStatus::InProgress);
    assert_eq!(
        center.approve("pr-self-healing", None),
        Err(Rejection::DeploymentActive("self-healing".to_string()))
    );

    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert_eq!(deployment_status(&center), DeploymentStatus::Deployed);

    let alerts = center.run_compliance_scan();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, staging_alert_id("self-healing", "anomalies"));
    assert_eq!(alerts[0].location, "Staging: Automated Self-Healing");
}

#[tokio::test(start_paused = true)]
async fn test_failed_deployment_can_be_retried() {
    let center = center(1);
    complete_self_healing(&center).await;

    center.approve("pr-self-healing", None).unwrap();
    tokio::time::sleep(Duration::from_millis(3001)).await;

    assert_eq!(deployment_status(&center), DeploymentStatus::InProgress);
    let (review_status, latest) = center.read(|s| {
        (
            s.reviews.get("pr-self-healing").unwrap().status,
            s.chronicle.latest().cloned().unwrap(),
        )
    });
    assert_eq!(review_status, ReviewStatus::Closed);
    assert_eq!(latest.kind, ChronicleLogType::Anomaly);
    assert!(latest.message.contains("staging unreachable"));

    center.approve("pr-self-healing", None).unwrap();
    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert_eq!(deployment_status(&center), DeploymentStatus::Deployed);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_deployment() {
    let center = center(0);
    complete_self_healing(&center).await;

    center.approve("pr-self-healing", None).unwrap();
    center.shutdown();
    tokio::time::sleep(Duration::from_millis(5000)).await;

    assert_eq!(deployment_status(&center), DeploymentStatus::InProgress);
}
