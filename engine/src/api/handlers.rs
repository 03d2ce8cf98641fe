use super::{ApiError, ApiState};
use crate::proxy::{GeminiReply, GeminiRequest, ProxyError};
use crate::state::{Promotion, StateSnapshot};
use crate::store::mind_map::{ideation_prompt, parse_ideas};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sdk::types::{
    Agent, AiService, ChronicleLog, ChronicleLogType, CodeReviewItem, ComplianceAlert, Directive,
    KnowledgeFile, KnowledgeFileType, MindMapNode, Position,
};
use serde::Deserialize;
use serde_json::{json, Value};

type ApiResult<T> = Result<T, ApiError>;

// ---- Request bodies ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    agent_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    task_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    directive_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeRequest {
    name: String,
    #[serde(rename = "type")]
    kind: KnowledgeFileType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    label: String,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    ai_service: Option<AiService>,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BytebotTaskRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

// ---- Snapshots ----

pub async fn status(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "service": "dlx-command-center",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "activeWork": state.center.active_work(),
    }))
}

pub async fn state(State(state): State<ApiState>) -> Json<StateSnapshot> {
    Json(state.center.snapshot())
}

pub async fn list_directives(State(state): State<ApiState>) -> Json<Vec<Directive>> {
    Json(state.center.read(|s| s.directives.list().to_vec()))
}

pub async fn get_directive(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Directive>> {
    state
        .center
        .read(|s| s.directives.get(&id).cloned())
        .map(Json)
        .ok_or_else(|| crate::lifecycle::Rejection::UnknownDirective(id).into())
}

pub async fn list_agents(State(state): State<ApiState>) -> Json<Vec<Agent>> {
    Json(state.center.read(|s| s.agents.list().to_vec()))
}

pub async fn list_reviews(State(state): State<ApiState>) -> Json<Vec<CodeReviewItem>> {
    Json(state.center.read(|s| s.reviews.list().to_vec()))
}

pub async fn list_alerts(State(state): State<ApiState>) -> Json<Vec<ComplianceAlert>> {
    Json(state.center.read(|s| s.alerts.list().to_vec()))
}

pub async fn chronicle(State(state): State<ApiState>) -> Json<Vec<ChronicleLog>> {
    Json(state.center.read(|s| s.chronicle.entries()))
}

pub async fn health(State(state): State<ApiState>) -> Json<Value> {
    let (value, threshold) = state
        .center
        .read(|s| (s.health.value(), s.health.threshold()));
    Json(json!({
        "systemHealth": value,
        "threshold": threshold,
        "critical": value <= threshold,
    }))
}

pub async fn list_knowledge(State(state): State<ApiState>) -> Json<Vec<KnowledgeFile>> {
    Json(state.center.read(|s| s.knowledge.list().to_vec()))
}

pub async fn mind_map(State(state): State<ApiState>) -> Json<Vec<MindMapNode>> {
    Json(state.center.read(|s| s.mind_map.list().to_vec()))
}

// ---- Commands ----

pub async fn assign_task(
    State(state): State<ApiState>,
    Path((directive_id, task_id)): Path<(String, String)>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Directive>> {
    state.center.assign(&directive_id, &task_id, &req.agent_id)?;
    current_directive(&state, directive_id)
}

pub async fn unassign_task(
    State(state): State<ApiState>,
    Path((directive_id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<Directive>> {
    state.center.unassign(&directive_id, &task_id)?;
    current_directive(&state, directive_id)
}

pub async fn queue_task(
    State(state): State<ApiState>,
    Path(agent_id): Path<String>,
    Json(req): Json<QueueRequest>,
) -> ApiResult<Json<Value>> {
    let started = state.center.enqueue(&agent_id, &req.task_id)?;
    let agent = state.center.read(|s| s.agents.get(&agent_id).cloned());
    Ok(Json(json!({
        "started": started.is_some(),
        "agent": agent,
    })))
}

pub async fn approve_review(
    State(state): State<ApiState>,
    Path(review_id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<impl IntoResponse> {
    let directive_id = body.and_then(|Json(req)| req.directive_id);
    let order = state.center.approve(&review_id, directive_id.as_deref())?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "reviewId": order.review_id,
            "directiveId": order.directive_id,
            "deploymentStatus": "in_progress",
        })),
    ))
}

pub async fn acknowledge_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<String>,
) -> ApiResult<Json<ComplianceAlert>> {
    Ok(Json(state.center.acknowledge_alert(&alert_id)?))
}

pub async fn register_knowledge(
    State(state): State<ApiState>,
    Json(req): Json<KnowledgeRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("File name is required.".to_string()));
    }
    let file = state.center.register_knowledge(name, req.kind);
    Ok((StatusCode::CREATED, Json(file)))
}

pub async fn add_node(
    State(state): State<ApiState>,
    Json(req): Json<NodeRequest>,
) -> ApiResult<impl IntoResponse> {
    let label = req.label.trim();
    if label.is_empty() {
        return Err(ApiError::BadRequest("Node label is required.".to_string()));
    }
    let node = state
        .center
        .add_node(label, req.parent_id, req.position, req.ai_service)?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn promote_node(
    State(state): State<ApiState>,
    Path(node_id): Path<String>,
    Json(promotion): Json<Promotion>,
) -> ApiResult<impl IntoResponse> {
    let directive = state.center.promote_node(&node_id, promotion)?;
    Ok((StatusCode::CREATED, Json(directive)))
}

/// Ask Gemini for sub-ideas of a node and attach them as children
pub async fn ideate_node(
    State(state): State<ApiState>,
    Path(node_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let node = state.center.ideation_target(&node_id)?;
    state.center.record(
        ChronicleLogType::Agent,
        format!("AI Ideation started for node: \"{}\"", node.label),
    );

    let request = GeminiRequest {
        contents: Some(Value::String(ideation_prompt(&node.label))),
        config: Some(json!({ "responseMimeType": "application/json" })),
        use_search: false,
    };
    let reply = match state.proxies.gemini.generate(request).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(node_id = %node_id, "Ideation request failed: {}", e);
            state.center.record(
                ChronicleLogType::Anomaly,
                "AI Ideation failed: An error occurred during API call.",
            );
            return Err(e.into());
        }
    };

    let ideas = match parse_ideas(&reply.text) {
        Ok(ideas) => ideas,
        Err(e) => {
            tracing::warn!(node_id = %node_id, "Ideation answer rejected: {}", e);
            state
                .center
                .record(ChronicleLogType::Anomaly, format!("AI Ideation failed: {}", e));
            return Err(ProxyError::Parse {
                service: "Gemini",
                message: e.to_string(),
            }
            .into());
        }
    };

    let children = state.center.expand_node(&node_id, ideas)?;
    Ok((StatusCode::CREATED, Json(children)))
}

// ---- Proxies ----

pub async fn gemini(
    State(state): State<ApiState>,
    Json(req): Json<GeminiRequest>,
) -> ApiResult<Json<GeminiReply>> {
    let reply = state
        .proxies
        .gemini
        .generate(req)
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(reply))
}

pub async fn grok(
    State(state): State<ApiState>,
    Json(req): Json<PromptRequest>,
) -> ApiResult<Json<Value>> {
    let text = state
        .proxies
        .groq
        .complete(req.prompt.as_deref())
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(json!({ "text": text })))
}

pub async fn copilot(
    State(state): State<ApiState>,
    Json(req): Json<PromptRequest>,
) -> ApiResult<Json<Value>> {
    let text = state
        .proxies
        .openai
        .complete(req.prompt.as_deref())
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(json!({ "text": text })))
}

pub async fn bytebot_task(
    State(state): State<ApiState>,
    Json(req): Json<BytebotTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .proxies
        .bytebot
        .create_task(req.name.as_deref(), req.description.as_deref())
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn bytebot_desktop(State(state): State<ApiState>) -> ApiResult<Json<Value>> {
    let body = state
        .proxies
        .bytebot
        .desktop()
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(body))
}

pub async fn bytebot_click(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let body = state
        .proxies
        .bytebot
        .click(body)
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(body))
}

pub async fn bytebot_type(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let body = state
        .proxies
        .bytebot
        .type_text(body)
        .await
        .map_err(|e| proxy_failure(&state, e))?;
    Ok(Json(body))
}

fn current_directive(state: &ApiState, directive_id: String) -> ApiResult<Json<Directive>> {
    state
        .center
        .read(|s| s.directives.get(&directive_id).cloned())
        .map(Json)
        .ok_or_else(|| crate::lifecycle::Rejection::UnknownDirective(directive_id).into())
}

/// Chronicle an upstream failure; bad requests are the caller's problem and stay quiet
fn proxy_failure(state: &ApiState, err: ProxyError) -> ApiError {
    if !matches!(err, ProxyError::InvalidRequest(_)) {
        tracing::warn!(status = err.status_code(), "Proxy request failed: {}", err);
        state.center.record(ChronicleLogType::Anomaly, err.to_string());
    }
    err.into()
}
