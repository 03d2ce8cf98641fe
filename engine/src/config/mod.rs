//! Configuration management
//!
//! This module handles loading, validation, and management of the DLX configuration.
//! Configuration is stored in TOML format at ~/.dlx/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, listen address, optional static UI directory
//! - **auth**: Operator shared secret
//! - **simulation**: Work-unit and deployment timings
//! - **compliance**: Scan interval and forbidden keywords
//! - **health**: Health monitor tick interval, starting value and alert threshold
//! - **providers**: Gemini, Groq, OpenAI and Bytebot endpoints
//!
//! API keys never live in the config file. Each provider names the environment
//! variable holding its key (`api_key_env`), and the binary loads a `.env` file
//! at startup so the variables can be kept next to the working directory.
//!
//! # Examples
//!
//! ```no_run
//! use dlx_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! // Access configuration values
//! println!("Listening on: {}", config.core.bind);
//! println!("Scan every {}s", config.compliance.scan_interval_secs);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Only the `core` section is required; every other section falls back to
/// its defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Operator authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Simulated work and deployment timings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Compliance scanner settings
    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// System health monitor settings
    #[serde(default)]
    pub health: HealthConfig,

    /// Third-party service endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Socket address the API server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding a built dashboard to serve as static files (supports ~ expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_dir: Option<PathBuf>,
}

/// Operator authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret checked by `POST /api/auth`
    #[serde(default = "default_shared_secret")]
    pub shared_secret: String,
}

/// Timings for simulated work units and deployments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lower bound (inclusive) of a simulated task duration in milliseconds
    #[serde(default = "default_work_min_ms")]
    pub work_min_ms: u64,

    /// Upper bound (exclusive) of a simulated task duration in milliseconds
    #[serde(default = "default_work_max_ms")]
    pub work_max_ms: u64,

    /// Fixed duration of a simulated deployment in milliseconds
    #[serde(default = "default_deploy_delay_ms")]
    pub deploy_delay_ms: u64,
}

/// Compliance scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Seconds between scans
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Forbidden keywords, matched case-insensitively
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

/// System health monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Seconds between random-walk steps
    #[serde(default = "default_health_interval")]
    pub tick_interval_secs: u64,

    /// Health value at startup
    #[serde(default = "default_initial_health")]
    pub initial: f64,

    /// Crossing this value emits an anomaly or recovery event
    #[serde(default = "default_health_threshold")]
    pub threshold: f64,
}

/// Third-party service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Google Gemini settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Groq settings (served as `/api/grok`)
    #[serde(default = "ChatProviderConfig::groq")]
    pub groq: ChatProviderConfig,

    /// OpenAI settings (served as `/api/copilot`)
    #[serde(default = "ChatProviderConfig::openai")]
    pub openai: ChatProviderConfig,

    /// Bytebot remote-desktop daemon settings
    #[serde(default)]
    pub bytebot: BytebotConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
}

/// OpenAI-compatible chat completions provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatProviderConfig {
    /// Base URL for the chat completions API
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl ChatProviderConfig {
    pub fn groq() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }

    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            groq: ChatProviderConfig::groq(),
            openai: ChatProviderConfig::openai(),
            bytebot: BytebotConfig::default(),
        }
    }
}

/// Bytebot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BytebotConfig {
    /// Base URL of the Bytebot daemon
    #[serde(default = "default_bytebot_base_url")]
    pub base_url: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_shared_secret() -> String {
    "lux2.0".to_string()
}

fn default_work_min_ms() -> u64 {
    3000
}

fn default_work_max_ms() -> u64 {
    5000
}

fn default_deploy_delay_ms() -> u64 {
    3000
}

fn default_scan_interval() -> u64 {
    12
}

fn default_keywords() -> Vec<String> {
    ["proprietary", "classified", "confidential", "secret", "internal only"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_health_interval() -> u64 {
    5
}

fn default_initial_health() -> f64 {
    99.8
}

fn default_health_threshold() -> f64 {
    85.0
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_key_env() -> String {
    "API_KEY".to_string()
}

fn default_bytebot_base_url() -> String {
    "http://localhost:9991".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bind: default_bind(),
            ui_dir: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: default_shared_secret(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            work_min_ms: default_work_min_ms(),
            work_max_ms: default_work_max_ms(),
            deploy_delay_ms: default_deploy_delay_ms(),
        }
    }
}

impl SimulationConfig {
    pub fn work_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.work_min_ms),
            Duration::from_millis(self.work_max_ms),
        )
    }

    pub fn deploy_delay(&self) -> Duration {
        Duration::from_millis(self.deploy_delay_ms)
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
            keywords: default_keywords(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_health_interval(),
            initial: default_initial_health(),
            threshold: default_health_threshold(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key_env: default_gemini_key_env(),
        }
    }
}

impl Default for BytebotConfig {
    fn default() -> Self {
        Self {
            base_url: default_bytebot_base_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            auth: AuthConfig::default(),
            simulation: SimulationConfig::default(),
            compliance: ComplianceConfig::default(),
            health: HealthConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.dlx/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Get the default configuration file path (~/.dlx/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".dlx").join("config.toml"))
    }

    /// Validate and process configuration
    ///
    /// Rejects values the engine cannot run with and expands `~` in the
    /// optional UI directory.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.core.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(EngineError::Config(format!(
                "Invalid bind address '{}'",
                self.core.bind
            )));
        }

        if self.auth.shared_secret.is_empty() {
            return Err(EngineError::Config(
                "auth.shared_secret must not be empty".to_string(),
            ));
        }

        if self.simulation.work_min_ms >= self.simulation.work_max_ms {
            return Err(EngineError::Config(
                "simulation.work_min_ms must be less than simulation.work_max_ms".to_string(),
            ));
        }

        if self.compliance.scan_interval_secs == 0 || self.health.tick_interval_secs == 0 {
            return Err(EngineError::Config(
                "scan and tick intervals must be at least 1 second".to_string(),
            ));
        }

        // Keywords are matched lowercase; blank entries would match everything
        self.compliance.keywords = self
            .compliance
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if self.compliance.keywords.is_empty() {
            return Err(EngineError::Config(
                "compliance.keywords must contain at least one keyword".to_string(),
            ));
        }

        if !(70.0..=100.0).contains(&self.health.initial)
            || !(70.0..=100.0).contains(&self.health.threshold)
        {
            return Err(EngineError::Config(
                "health.initial and health.threshold must be between 70 and 100".to_string(),
            ));
        }

        if let Some(dir) = &self.core.ui_dir {
            self.core.ui_dir = Some(expand_path(dir)?);
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.core.bind, "127.0.0.1:3001");
        assert_eq!(config.simulation.work_min_ms, 3000);
        assert_eq!(config.simulation.work_max_ms, 5000);
        assert_eq!(config.simulation.deploy_delay_ms, 3000);
        assert_eq!(config.compliance.scan_interval_secs, 12);
        assert_eq!(config.compliance.keywords.len(), 5);
        assert_eq!(config.health.tick_interval_secs, 5);
        assert_eq!(config.providers.groq.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.providers.openai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str("[core]\n").unwrap();

        assert_eq!(config.auth.shared_secret, "lux2.0");
        assert_eq!(config.providers.gemini.api_key_env, "API_KEY");
        assert_eq!(config.providers.bytebot.base_url, "http://localhost:9991");
    }

    #[test]
    fn test_keywords_are_normalised() {
        let config = Config::from_toml_str(
            r#"
[core]

[compliance]
keywords = ["  SECRET ", "", "Internal Only"]
"#,
        )
        .unwrap();

        assert_eq!(config.compliance.keywords, vec!["secret", "internal only"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_level = Config::from_toml_str("[core]\nlog_level = \"loud\"\n");
        assert!(matches!(bad_level, Err(EngineError::Config(_))));

        let bad_window = Config::from_toml_str(
            "[core]\n[simulation]\nwork_min_ms = 5000\nwork_max_ms = 3000\n",
        );
        assert!(bad_window.is_err());

        let no_keywords = Config::from_toml_str("[core]\n[compliance]\nkeywords = []\n");
        assert!(no_keywords.is_err());

        let bad_bind = Config::from_toml_str("[core]\nbind = \"not an address\"\n");
        assert!(bad_bind.is_err());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/dist");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("dist"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized = Config::from_toml_str(&toml_string).unwrap();
        assert_eq!(config.core.bind, deserialized.core.bind);
        assert_eq!(config.compliance.keywords, deserialized.compliance.keywords);
    }
}
