//! Deployment Simulator
//!
//! Approving a review moves its directive from `in_review` to `in_progress`
//! and hands it to a [`Deployer`]. The deployer's outcome decides the rest:
//!
//! - success: the directive becomes `deployed`
//! - failure: the review is closed, the directive stays `in_progress` and
//!   the operator may approve again
//!
//! Only one deployment per directive runs at a time.

use crate::lifecycle::Rejection;
use crate::state::CommandState;
use crate::store::DirectivePatch;
use async_trait::async_trait;
use sdk::types::{ChronicleLogType, DeploymentStatus, ReviewStatus};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeployError {
    #[error("{0}")]
    Failed(String),
}

/// An approved directive waiting for its deployer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOrder {
    pub review_id: String,
    pub directive_id: String,
}

/// Ships an approved directive
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, order: &DeploymentOrder) -> Result<(), DeployError>;
}

/// Waits a fixed delay and succeeds
#[derive(Debug, Clone)]
pub struct SimulatedDeployer {
    delay: Duration,
}

impl SimulatedDeployer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Deployer for SimulatedDeployer {
    async fn deploy(&self, order: &DeploymentOrder) -> Result<(), DeployError> {
        tracing::debug!(directive_id = %order.directive_id, delay_ms = self.delay.as_millis() as u64, "Simulating deployment");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

impl CommandState {
    /// Approve a review and start deploying its directive
    ///
    /// Accepts an open review on an `in_review` directive, or a review closed
    /// by a failed deployment on a directive still `in_progress`.
    pub fn approve_review(&mut self, review_id: &str, directive_id: &str) -> Result<DeploymentOrder, Rejection> {
        let review = self
            .reviews
            .get(review_id)
            .ok_or_else(|| Rejection::UnknownReview(review_id.to_string()))?;
        if review.directive_id.as_deref() != Some(directive_id) {
            return Err(Rejection::ReviewMismatch {
                review_id: review_id.to_string(),
                directive_id: directive_id.to_string(),
            });
        }
        let directive = self
            .directives
            .get(directive_id)
            .ok_or_else(|| Rejection::UnknownDirective(directive_id.to_string()))?;

        if self.deploying.contains(directive_id) {
            return Err(Rejection::DeploymentActive(directive_id.to_string()));
        }

        let retry = match (review.status, directive.deployment_status) {
            (ReviewStatus::Open, DeploymentStatus::InReview) => false,
            (ReviewStatus::Closed, DeploymentStatus::InProgress) => true,
            (ReviewStatus::Open, status) | (ReviewStatus::Closed, status) => {
                return Err(Rejection::NotAwaitingDeployment {
                    directive_id: directive_id.to_string(),
                    status,
                })
            }
            (status, _) => {
                return Err(Rejection::ReviewNotOpen {
                    review_id: review_id.to_string(),
                    status,
                })
            }
        };
        let title = directive.title.clone();

        self.reviews.set_status(review_id, ReviewStatus::Merged);
        self.directives
            .update(directive_id, DirectivePatch::deployment(DeploymentStatus::InProgress));
        self.deploying.insert(directive_id.to_string());

        let message = if retry {
            format!("PR re-approved. Retrying deployment: \"{}\"", title)
        } else {
            format!("PR approved. Deploying: \"{}\"", title)
        };
        self.chronicle.record(ChronicleLogType::Directive, message);

        Ok(DeploymentOrder {
            review_id: review_id.to_string(),
            directive_id: directive_id.to_string(),
        })
    }

    /// Apply a deployer's outcome
    pub fn finish_deployment(&mut self, order: &DeploymentOrder, outcome: Result<(), DeployError>) {
        self.deploying.remove(&order.directive_id);

        let title = self
            .directives
            .get(&order.directive_id)
            .map(|d| d.title.clone())
            .unwrap_or_else(|| order.directive_id.clone());

        match outcome {
            Ok(()) => {
                self.directives.update(
                    &order.directive_id,
                    DirectivePatch::deployment(DeploymentStatus::Deployed),
                );
                self.chronicle.record(
                    ChronicleLogType::System,
                    format!("Deployment successful for \"{}\"", title),
                );
            }
            Err(err) => {
                self.reviews.set_status(&order.review_id, ReviewStatus::Closed);
                self.chronicle.record(
                    ChronicleLogType::Anomaly,
                    format!("Deployment failed for \"{}\": {}", title, err),
                );
            }
        }
    }
}
