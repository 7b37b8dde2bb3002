//! Optional WebSocket listener carrying the same JSON-RPC frames as stdio.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};

use crate::composition::AppState;
use crate::run::stdio::handle_line;

pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/ws", get(upgrade))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(bind = %bind, "WebSocket listener up");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    while let Some(message) = receiver.next().await {
        let frame = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            _ => continue,
        };
        let response = handle_line(&state, &frame).await;
        let framed = match serde_json::to_string(&response) {
            Ok(framed) => framed,
            Err(err) => {
                tracing::error!(error = %err, "Response serialization failed");
                continue;
            }
        };
        if sender.send(Message::Text(framed.into())).await.is_err() {
            break;
        }
    }
    tracing::debug!("WebSocket connection closed");
}
