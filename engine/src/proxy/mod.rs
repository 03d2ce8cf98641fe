//! Proxy Gateway
//!
//! Server-side clients for the third-party services the dashboard talks to.
//! API keys never leave the server: the dashboard calls `/api/gemini`,
//! `/api/grok`, `/api/copilot` and `/api/bytebot/*`, and these clients add
//! credentials and forward.
//!
//! Failures are classified by [`ProxyError`] and never retried.

pub mod bytebot;
pub mod chat;
pub mod gemini;

pub use bytebot::BytebotClient;
pub use chat::ChatClient;
pub use gemini::{GeminiClient, GeminiReply, GeminiRequest, Source};

use crate::config::ProvidersConfig;
use sdk::errors::EngineError;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout for upstream calls
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0} API key not configured on server.")]
    NotConfigured(&'static str),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to fetch from {service} API: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
        /// Upstream error document, forwarded verbatim when present
        body: Option<Value>,
    },

    #[error("Failed to fetch from {service} API: {message}")]
    Unreachable {
        service: &'static str,
        message: String,
    },

    #[error("{0} service is unavailable.")]
    Unavailable(&'static str),

    #[error("Malformed response from {service}: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },
}

impl ProxyError {
    /// HTTP status returned to the dashboard
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotConfigured(_) => 500,
            Self::InvalidRequest(_) => 400,
            Self::Upstream { status, .. } => *status,
            Self::Unreachable { .. } | Self::Parse { .. } => 502,
            Self::Unavailable(_) => 503,
        }
    }

    /// JSON body returned to the dashboard
    pub fn body(&self) -> Value {
        match self {
            Self::Upstream {
                body: Some(body), ..
            } => body.clone(),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl From<ProxyError> for EngineError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::NotConfigured(service) => EngineError::ServiceNotConfigured(service.to_string()),
            ProxyError::Unreachable { .. } | ProxyError::Unavailable(_) => {
                EngineError::Network(err.to_string())
            }
            other => EngineError::Proxy(other.to_string()),
        }
    }
}

/// HTTP client shared by the proxy clients
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Pull `error.message` (or a bare `error` string) out of an upstream error document
pub(crate) fn upstream_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Read an API key from the environment, treating blank values as unset
pub fn env_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// All upstream clients
pub struct ProxyGateway {
    pub gemini: GeminiClient,
    pub groq: ChatClient,
    pub openai: ChatClient,
    pub bytebot: BytebotClient,
}

impl ProxyGateway {
    /// Build the clients, reading API keys from the configured env vars
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            gemini: GeminiClient::new(&config.gemini, env_key(&config.gemini.api_key_env)),
            groq: ChatClient::new("Groq", &config.groq, env_key(&config.groq.api_key_env)),
            openai: ChatClient::new("OpenAI", &config.openai, env_key(&config.openai.api_key_env)),
            bytebot: BytebotClient::new(&config.bytebot.base_url),
        }
    }

    /// Environment variables whose key is missing
    pub fn missing_keys(&self, config: &ProvidersConfig) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.gemini.is_configured() {
            missing.push(config.gemini.api_key_env.clone());
        }
        if !self.groq.is_configured() {
            missing.push(config.groq.api_key_env.clone());
        }
        if !self.openai.is_configured() {
            missing.push(config.openai.api_key_env.clone());
        }
        missing
    }
}
