//! Error types and handling
//!
//! This module provides the error types used throughout the DLX engine.
//! All errors implement the `DlxErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry API keys or the shared operator secret, so they
//! are safe to return to the dashboard client verbatim.

use thiserror::Error;

/// Trait for DLX error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait DlxErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain:
    /// - Secrets (API keys, operator passwords)
    /// - Internal implementation details
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require a configuration change or restart.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Network**: Listener or upstream connection failures
/// - **Proxy**: Third-party AI or remote-desktop service failures
/// - **State machine**: Rejected directive/task/agent transitions
///
/// # Examples
///
/// ```
/// use sdk::errors::{DlxErrorExt, EngineError};
///
/// let error = EngineError::InvalidTransition("agent busy".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad log level".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Upstream service errors
    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("Service not configured: {0}")]
    ServiceNotConfigured(String),

    // State machine errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    // Authentication errors
    #[error("Access denied")]
    AccessDenied,

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DlxErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Proxy(_) => "Upstream service failed. Check the service and try again",
            Self::ServiceNotConfigured(_) => "Set the service API key in your environment or .env file",
            Self::NotFound(_) => "The requested item does not exist",
            Self::InvalidTransition(_) => "That action is not allowed in the current state",
            Self::AccessDenied => "Access denied. Check the operator password",
            Self::Serialization(_) => "Malformed data received",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::ServiceNotConfigured(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
