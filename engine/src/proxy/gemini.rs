//! Google Gemini client
//!
//! Calls the `generateContent` REST endpoint. The dashboard sends SDK-style
//! requests (`contents` as a string or content list, a flat `config` object,
//! an optional `useSearch` flag); [`build_payload`] maps them onto the REST
//! shape. Search grounding adds the `googleSearch` tool and the reply carries
//! the web sources the answer was grounded on.

use super::{http_client, upstream_message, ProxyError};
use crate::config::GeminiConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const SERVICE: &str = "Gemini";

/// `config` keys that live at the top level of the REST request
const TOP_LEVEL_KEYS: [&str; 4] = ["systemInstruction", "tools", "toolConfig", "safetySettings"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(default)]
    pub contents: Option<Value>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub use_search: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiReply {
    pub text: String,
    pub sources: Vec<Source>,
}

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client: http_client(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate(&self, request: GeminiRequest) -> Result<GeminiReply, ProxyError> {
        let api_key = self.api_key.as_deref().ok_or(ProxyError::NotConfigured(SERVICE))?;

        let contents = match request.contents {
            Some(Value::Null) | None => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(contents) => Some(contents),
        }
        .ok_or_else(|| {
            ProxyError::InvalidRequest(
                "A \"contents\" property is required in the request body.".to_string(),
            )
        })?;

        let payload = build_payload(contents, request.config, request.use_search);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(model = %self.model, use_search = request.use_search, "Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProxyError::Unreachable {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = upstream_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(ProxyError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message,
                body: None,
            });
        }

        let data: Value = response.json().await.map_err(|e| ProxyError::Parse {
            service: SERVICE,
            message: e.to_string(),
        })?;

        extract_reply(&data)
    }
}

/// Normalise SDK-style contents into the REST content list
fn normalise_contents(contents: Value) -> Value {
    match contents {
        Value::String(text) => json!([{ "role": "user", "parts": [{ "text": text }] }]),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => json!({ "role": "user", "parts": [{ "text": text }] }),
                    other => other,
                })
                .collect(),
        ),
        single => json!([single]),
    }
}

/// Build the `generateContent` request body
pub fn build_payload(contents: Value, config: Option<Value>, use_search: bool) -> Value {
    let mut payload = Map::new();
    payload.insert("contents".to_string(), normalise_contents(contents));

    let mut generation = Map::new();
    if let Some(Value::Object(config)) = config {
        for (key, value) in config {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                generation.insert(key, value);
                continue;
            }
            let value = match (key.as_str(), value) {
                ("systemInstruction", Value::String(text)) => json!({ "parts": [{ "text": text }] }),
                (_, value) => value,
            };
            payload.insert(key, value);
        }
    }

    if use_search {
        let tools = payload
            .entry("tools")
            .or_insert_with(|| Value::Array(Vec::new()));
        match tools {
            Value::Array(list) => list.push(json!({ "googleSearch": {} })),
            other => *other = json!([{ "googleSearch": {} }]),
        }
    }

    if !generation.is_empty() {
        payload.insert("generationConfig".to_string(), Value::Object(generation));
    }

    Value::Object(payload)
}

/// Concatenate the first candidate's text parts and collect grounding sources
pub fn extract_reply(data: &Value) -> Result<GeminiReply, ProxyError> {
    let candidate = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| ProxyError::Parse {
            service: SERVICE,
            message: "No candidates in response".to_string(),
        })?;

    let text = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .pointer("/groundingMetadata/groundingChunks")
        .and_then(|c| c.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    let uri = web.get("uri")?.as_str().filter(|s| !s.is_empty())?;
                    let title = web.get("title")?.as_str().filter(|s| !s.is_empty())?;
                    Some(Source {
                        uri: uri.to_string(),
                        title: title.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GeminiReply { text, sources })
}
