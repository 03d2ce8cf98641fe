use crate::lifecycle::Rejection;
use crate::proxy::ProxyError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// A command refused by the state machine
    Rejected(Rejection),
    /// An upstream service call failed
    Proxy(ProxyError),
    /// The request body was unusable
    BadRequest(String),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self::Proxy(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(rejection) => {
                let status = if rejection.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::CONFLICT
                };
                (
                    status,
                    Json(json!({
                        "error": rejection.to_string(),
                        "reason": rejection.reason(),
                    })),
                )
                    .into_response()
            }
            Self::Proxy(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(err.body())).into_response()
            }
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
