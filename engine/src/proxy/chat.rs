//! OpenAI-compatible chat completion client
//!
//! Serves both Groq (exposed to the dashboard as "grok") and OpenAI
//! (exposed as "copilot"); they differ only in base URL, model and key.

use super::{http_client, upstream_message, ProxyError};
use crate::config::ChatProviderConfig;
use serde_json::{json, Value};

pub struct ChatClient {
    service: &'static str,
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(service: &'static str, config: &ChatProviderConfig, api_key: Option<String>) -> Self {
        Self {
            service,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client: http_client(),
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a single user prompt and return the first choice's text
    pub async fn complete(&self, prompt: Option<&str>) -> Result<String, ProxyError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProxyError::NotConfigured(self.service))?;
        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ProxyError::InvalidRequest("Prompt is required.".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        tracing::debug!(service = self.service, model = %self.model, "Chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProxyError::Unreachable {
                service: self.service,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ProxyError::Upstream {
                service: self.service,
                status: status.as_u16(),
                message: upstream_message(&body).unwrap_or_else(|| "Unknown error".to_string()),
                body: None,
            });
        }

        let data: Value = response.json().await.map_err(|e| ProxyError::Parse {
            service: self.service,
            message: e.to_string(),
        })?;

        Ok(data
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("No response from {}.", self.service)))
    }
}
