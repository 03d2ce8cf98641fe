//! Bytebot remote-desktop client
//!
//! Thin pass-through: request bodies go upstream unchanged and upstream
//! error documents come back unchanged. Any transport failure means the
//! service is down.

use super::{http_client, ProxyError};
use reqwest::Method;
use serde_json::{json, Value};

const SERVICE: &str = "Bytebot";

pub struct BytebotClient {
    base_url: String,
    client: reqwest::Client,
}

impl BytebotClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a desktop automation task
    pub async fn create_task(&self, name: Option<&str>, description: Option<&str>) -> Result<Value, ProxyError> {
        let (Some(name), Some(description)) = (
            name.filter(|n| !n.trim().is_empty()),
            description.filter(|d| !d.trim().is_empty()),
        ) else {
            return Err(ProxyError::InvalidRequest(
                "Task name and description are required.".to_string(),
            ));
        };

        self.forward(
            Method::POST,
            "/tasks",
            Some(json!({ "name": name, "description": description })),
        )
        .await
    }

    /// Current desktop state (screenshot and metadata)
    pub async fn desktop(&self) -> Result<Value, ProxyError> {
        self.forward(Method::GET, "/v1/desktop", None).await
    }

    pub async fn click(&self, body: Value) -> Result<Value, ProxyError> {
        self.forward(Method::POST, "/v1/desktop/mouse/click", Some(body))
            .await
    }

    pub async fn type_text(&self, body: Value) -> Result<Value, ProxyError> {
        self.forward(Method::POST, "/v1/desktop/keyboard/type", Some(body))
            .await
    }

    /// Whether the service answers at all
    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/v1/desktop", self.base_url))
            .send()
            .await
            .is_ok()
    }

    async fn forward(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ProxyError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(url = %url, "Bytebot request failed: {}", e);
            ProxyError::Unavailable(SERVICE)
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error").to_string();
            let body = response
                .json::<Value>()
                .await
                .unwrap_or_else(|_| json!({ "error": reason }));
            return Err(ProxyError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message: reason,
                body: Some(body),
            });
        }

        response.json().await.map_err(|e| ProxyError::Parse {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}
