//! Daemon lifecycle management
//!
//! Wires the command center, the proxy clients and the API server together
//! and runs them until Ctrl-C or SIGTERM. It handles:
//! - Background loops for the compliance scanner and the health monitor
//! - Serving the HTTP API (and the dashboard, when `core.ui_dir` is set)
//! - Graceful shutdown: stop accepting requests, stop the loops, abort any
//!   running work units and deployments
//!
//! # Examples
//!
//! ```no_run
//! use dlx_engine::config::Config;
//! use dlx_engine::daemon::Daemon;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! Daemon::new(config).run().await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{build_router, ApiState, SecretDigest};
use crate::center::CommandCenter;
use crate::config::Config;
use crate::health::HealthEvent;
use crate::proxy::ProxyGateway;
use sdk::errors::EngineError;
use sdk::types::ChronicleLogType;

/// Result type for daemon operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// The running command center process
pub struct Daemon {
    config: Config,
    center: CommandCenter,
}

impl Daemon {
    /// Build a seeded command center from configuration
    pub fn new(config: Config) -> Self {
        let center = CommandCenter::from_config(&config);
        Self { config, center }
    }

    pub fn center(&self) -> &CommandCenter {
        &self.center
    }

    /// Serve until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.core.bind)
            .await
            .map_err(|e| {
                EngineError::Network(format!("Failed to bind {}: {}", self.config.core.bind, e))
            })?;
        let addr = listener.local_addr().map_err(EngineError::Io)?;

        self.serve(listener, shutdown_signal()).await?;
        tracing::info!("Server on {} stopped", addr);
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let proxies = ProxyGateway::from_config(&self.config.providers);
        for var in proxies.missing_keys(&self.config.providers) {
            tracing::warn!("{} is not set; the matching proxy endpoint will answer 500", var);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let loops = self.spawn_background_loops(shutdown_rx);

        let state = ApiState::new(
            self.center.clone(),
            proxies,
            SecretDigest::new(&self.config.auth.shared_secret),
        );
        let app = build_router(state, self.config.core.ui_dir.as_deref());

        let addr = listener.local_addr().map_err(EngineError::Io)?;
        tracing::info!("DLX Command Center listening on http://{}", addr);
        self.center.record(
            ChronicleLogType::System,
            format!("Command Center server online at {}", addr),
        );

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| EngineError::Network(format!("Server error: {}", e)));

        tracing::info!("Shutting down background loops");
        shutdown_tx.send(true).ok();
        for handle in loops {
            handle.await.ok();
        }
        self.center.shutdown();

        served
    }

    fn spawn_background_loops(&self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let scan_center = self.center.clone();
        let scanner = spawn_periodic(
            "compliance",
            Duration::from_secs(self.config.compliance.scan_interval_secs),
            shutdown_rx.clone(),
            move || {
                let alerts = scan_center.run_compliance_scan();
                if !alerts.is_empty() {
                    tracing::info!(new_alerts = alerts.len(), "Compliance scan complete");
                }
            },
        );

        let health_center = self.center.clone();
        let health = spawn_periodic(
            "health",
            Duration::from_secs(self.config.health.tick_interval_secs),
            shutdown_rx,
            move || match health_center.tick_health() {
                Some(HealthEvent::Critical(value)) => {
                    tracing::warn!(value, "System health critical");
                }
                Some(HealthEvent::Restored(value)) => {
                    tracing::info!(value, "System health restored");
                }
                None => {}
            },
        );

        vec![scanner, health]
    }
}

/// Run `tick` every `period` until the shutdown channel flips
///
/// The first tick fires one full period after start.
pub fn spawn_periodic<F>(
    name: &'static str,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => tick(),
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("{} loop stopped", name);
    })
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_skips_immediate_tick() {
        let (tx, rx) = watch::channel(false);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let handle = spawn_periodic("test", Duration::from_secs(5), rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_stops_when_sender_dropped() {
        let (tx, rx) = watch::channel(false);
        let handle = spawn_periodic("test", Duration::from_secs(1), rx, || {});
        drop(tx);
        handle.await.unwrap();
    }
}
