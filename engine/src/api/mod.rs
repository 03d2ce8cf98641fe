//! API Server
//!
//! HTTP + WebSocket surface of the command center.
//!
//! # Endpoints
//!
//! - GET /api/status - Server version and uptime
//! - GET /api/state - Full dashboard snapshot
//! - GET /api/directives, /api/agents, /api/reviews, /api/alerts,
//!   /api/chronicle, /api/health, /api/knowledge, /api/mindmap
//! - POST /api/directives/:id/tasks/:task_id/assign - Assign a task to an agent
//! - POST /api/directives/:id/tasks/:task_id/unassign - Return a task to pending
//! - POST /api/agents/:id/queue - Queue a task for an agent
//! - POST /api/reviews/:id/approve - Approve a review and deploy
//! - DELETE /api/alerts/:id - Acknowledge a compliance alert
//! - POST /api/knowledge - Register a knowledge file
//! - POST /api/mindmap/nodes - Add a mind map node
//! - POST /api/mindmap/nodes/:id/promote - Promote a node to a directive
//! - POST /api/mindmap/nodes/:id/ideate - Generate child ideas with Gemini
//! - POST /api/gemini, /api/grok, /api/copilot - AI proxies
//! - POST /api/bytebot/tasks, GET /api/bytebot/desktop,
//!   POST /api/bytebot/desktop/mouse/click, POST /api/bytebot/desktop/keyboard/type
//! - POST /api/auth - Operator password check
//! - GET /ws - Live chronicle stream

pub mod auth;
mod error;
mod handlers;
mod ws;

pub use auth::SecretDigest;
pub use error::ApiError;

use crate::center::CommandCenter;
use crate::proxy::ProxyGateway;
use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// State shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub center: CommandCenter,
    pub proxies: Arc<ProxyGateway>,
    pub secret: Arc<SecretDigest>,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(center: CommandCenter, proxies: ProxyGateway, secret: SecretDigest) -> Self {
        Self {
            center,
            proxies: Arc::new(proxies),
            secret: Arc::new(secret),
            started_at: Instant::now(),
        }
    }
}

/// Build the router; static dashboard files are served from `ui_dir` when given
pub fn build_router(state: ApiState, ui_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/status", get(handlers::status))
        .route("/api/state", get(handlers::state))
        .route("/api/directives", get(handlers::list_directives))
        .route("/api/directives/:id", get(handlers::get_directive))
        .route(
            "/api/directives/:id/tasks/:task_id/assign",
            post(handlers::assign_task),
        )
        .route(
            "/api/directives/:id/tasks/:task_id/unassign",
            post(handlers::unassign_task),
        )
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/:id/queue", post(handlers::queue_task))
        .route("/api/reviews", get(handlers::list_reviews))
        .route("/api/reviews/:id/approve", post(handlers::approve_review))
        .route("/api/alerts", get(handlers::list_alerts))
        .route("/api/alerts/:id", delete(handlers::acknowledge_alert))
        .route("/api/chronicle", get(handlers::chronicle))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/knowledge",
            get(handlers::list_knowledge).post(handlers::register_knowledge),
        )
        .route("/api/mindmap", get(handlers::mind_map))
        .route("/api/mindmap/nodes", post(handlers::add_node))
        .route("/api/mindmap/nodes/:id/promote", post(handlers::promote_node))
        .route("/api/mindmap/nodes/:id/ideate", post(handlers::ideate_node))
        .route("/api/gemini", post(handlers::gemini))
        .route("/api/grok", post(handlers::grok))
        .route("/api/copilot", post(handlers::copilot))
        .route("/api/bytebot/tasks", post(handlers::bytebot_task))
        .route("/api/bytebot/desktop", get(handlers::bytebot_desktop))
        .route(
            "/api/bytebot/desktop/mouse/click",
            post(handlers::bytebot_click),
        )
        .route(
            "/api/bytebot/desktop/keyboard/type",
            post(handlers::bytebot_type),
        )
        .route("/api/auth", post(auth::auth_handler))
        .route("/ws", get(ws::websocket_handler))
        .with_state(state);

    if let Some(dir) = ui_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(cors)
}
