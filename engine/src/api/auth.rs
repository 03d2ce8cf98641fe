//! Operator authentication
//!
//! The dashboard's landing page sends the operator password; the server only
//! keeps the SHA-256 digest of the shared secret and compares digests in
//! constant time.

use super::ApiState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sdk::types::ChronicleLogType;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

/// SHA-256 digest of the operator secret
pub struct SecretDigest([u8; 32]);

impl SecretDigest {
    pub fn new(secret: &str) -> Self {
        Self(Sha256::digest(secret.as_bytes()).into())
    }

    /// Compare a candidate password against the secret
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        self.0
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    password: Option<String>,
}

pub async fn auth_handler(State(state): State<ApiState>, Json(req): Json<AuthRequest>) -> Response {
    let granted = req
        .password
        .as_deref()
        .is_some_and(|p| state.secret.verify(p));

    if granted {
        state.center.record(
            ChronicleLogType::System,
            "Operator authenticated. Command Center online.",
        );
        (StatusCode::OK, Json(json!({ "message": "Access Granted" }))).into_response()
    } else {
        tracing::warn!("Rejected operator login");
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Access Denied" }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let digest = SecretDigest::new("lux2.0");
        assert!(digest.verify("lux2.0"));
        assert!(!digest.verify("lux2.1"));
        assert!(!digest.verify(""));
    }
}
