use super::ApiState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use serde_json::json;
use tokio::sync::broadcast;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Forward chronicle entries to the client as they are recorded
async fn handle_websocket(mut socket: WebSocket, state: ApiState) {
    tracing::info!("New WebSocket connection established");

    let mut event_rx = state.center.subscribe();

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let is_ping = serde_json::from_str::<serde_json::Value>(&text)
                            .ok()
                            .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(|t| t == "ping"))
                            .unwrap_or(false);

                        if is_ping {
                            let pong = json!({"type": "pong"});
                            if socket.send(Message::Text(pong.to_string())).await.is_err() {
                                break;
                            }
                        } else {
                            tracing::debug!("Ignoring WebSocket message: {}", text);
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket connection closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(entry) => {
                        let Ok(payload) = serde_json::to_string(&entry) else {
                            continue;
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("WebSocket client lagged, skipped {} events", skipped);
                    }
                    Err(_) => break,
                }
            }
        }
    }

    tracing::info!("WebSocket connection closed");
}
