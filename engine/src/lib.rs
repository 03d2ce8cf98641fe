//! DLX Engine Library
//!
//! This library provides the core functionality of the DLX Command Center.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Chronicle event log
pub mod chronicle;

/// Directive, agent, review, knowledge and mind-map stores
pub mod store;

/// Aggregate command center state and snapshots
pub mod state;

/// Task lifecycle state machine and work units
pub mod lifecycle;

/// Deployment simulator
pub mod deployment;

/// Compliance keyword scanner
pub mod compliance;

/// System health monitor
pub mod health;

/// Concurrent command center runtime
pub mod center;

/// Upstream AI and remote-desktop clients
pub mod proxy;

/// HTTP and WebSocket API
pub mod api;

/// Telemetry and Observability
pub mod telemetry;

/// Daemon lifecycle management module
pub mod daemon;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
