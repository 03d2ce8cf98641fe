//! Command handlers for CLI operations
//!
//! This module implements the handlers for the non-serving CLI commands:
//! - config show: Print the effective configuration
//! - config path: Print where the configuration file lives
//! - doctor: Validate configuration and check external services

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use crate::config::Config;
use crate::proxy::ProxyGateway;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Print the effective configuration
///
/// The operator secret is masked in both formats.
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    let mut shown = config.clone();
    shown.auth.shared_secret = "********".to_string();

    match format {
        OutputFormat::Text => {
            let text = toml::to_string_pretty(&shown).context("Failed to render configuration")?;
            println!("{}", text);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

/// Print the configuration file path
pub fn handle_config_path(path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "path": path,
                "exists": path.exists(),
            }))?
        ),
    }
    Ok(())
}

/// Collected diagnostics
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub checks: Vec<(String, String)>,
    pub issues: Vec<String>,
}

impl DoctorReport {
    fn check(&mut self, name: impl Into<String>, status: impl Into<String>) {
        self.checks.push((name.into(), status.into()));
    }

    pub fn healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run every diagnostic against a loaded configuration
pub async fn run_diagnostics(config: &Config) -> DoctorReport {
    let mut report = DoctorReport::default();

    // Config is already validated when loaded
    report.check("Configuration", "Valid");
    report.check("Listen address", config.core.bind.clone());

    match &config.core.ui_dir {
        Some(dir) if dir.join("index.html").exists() => report.check("Dashboard files", "Found"),
        Some(dir) => {
            report.check("Dashboard files", "Missing");
            report
                .issues
                .push(format!("No index.html in dashboard directory: {:?}", dir));
        }
        None => report.check("Dashboard files", "Not configured"),
    }

    let proxies = ProxyGateway::from_config(&config.providers);
    let keys = [
        ("Gemini API key", proxies.gemini.is_configured(), &config.providers.gemini.api_key_env),
        ("Groq API key", proxies.groq.is_configured(), &config.providers.groq.api_key_env),
        ("OpenAI API key", proxies.openai.is_configured(), &config.providers.openai.api_key_env),
    ];
    for (name, configured, var) in keys {
        if configured {
            report.check(name, "Configured");
        } else {
            report.check(name, "Not configured");
            report
                .issues
                .push(format!("{} is not set; its proxy endpoint will answer 500.", var));
        }
    }

    if proxies.bytebot.is_reachable().await {
        report.check("Bytebot", "Reachable");
    } else {
        report.check("Bytebot", "Unreachable");
        report.issues.push(format!(
            "Bytebot is not answering at {}. Desktop automation endpoints will answer 503.",
            proxies.bytebot.base_url()
        ));
    }

    report
}

/// Validate configuration and check provider keys and Bytebot reachability
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let report = run_diagnostics(config).await;

    match format {
        OutputFormat::Text => {
            println!("DLX System Diagnostics");
            println!("============================");
            println!();

            println!("System Checks:");
            for (check, status) in &report.checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if report.healthy() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in report.issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": report.checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": report.issues,
                "healthy": report.healthy()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_doctor_reports_reachable_bytebot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/desktop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.providers.bytebot.base_url = server.uri();

        let report = run_diagnostics(&config).await;
        assert!(report
            .checks
            .iter()
            .any(|(name, status)| name == "Bytebot" && status == "Reachable"));
    }

    #[tokio::test]
    async fn test_doctor_flags_unreachable_bytebot() {
        let mut config = Config::default();
        config.providers.bytebot.base_url = "http://127.0.0.1:1".to_string();

        let report = run_diagnostics(&config).await;
        assert!(!report.healthy());
        assert!(report.issues.iter().any(|i| i.contains("Bytebot")));
    }

    #[tokio::test]
    async fn test_doctor_flags_missing_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.core.ui_dir = Some(dir.path().to_path_buf());

        let report = run_diagnostics(&config).await;
        assert!(report
            .checks
            .iter()
            .any(|(name, status)| name == "Dashboard files" && status == "Missing"));
    }
}
