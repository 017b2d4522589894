use std::sync::Arc;
use axum::{
    extract::{Path, State, ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::StreamExt;
use tracing::{info, warn, error};

use crate::{models::BattleMap, AppState};

/// WebSocket endpoint of the single editor of a battle map
pub async fn edit_handler(
    Path(doc_id): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!(doc_id = %doc_id, "New editor connection attempt");
    ws.on_upgrade(move |socket| handle_editor(socket, doc_id, state))
}

/// Pump every map received from the editor into its session
async fn handle_editor(mut socket: WebSocket, doc_id: String, state: Arc<AppState>) {

    let editor = match state.registry.begin_edit(&doc_id).await {
        Ok(editor) => editor,
        Err(e) => {
            warn!(doc_id = %doc_id, "Refusing editor: {}", e);
            let close = CloseFrame { code: close_code::POLICY, reason: e.to_string().into() };
            let _ = socket.send(Message::Close(Some(close))).await;
            return;
        }
    };

    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let map: BattleMap = match serde_json::from_str(&text) {
                    Ok(map) => map,
                    Err(e) => {
                        error!(doc_id = %doc_id, "Invalid battle map message: {}", e);
                        continue;
                    }
                };

                info!(doc_id = %doc_id, "Map update received");
                if editor.send(Arc::new(map)).await.is_err() {
                    // The session was ended from elsewhere
                    warn!(doc_id = %doc_id, "Session closed while editor still connected");
                    break;
                }
            }
            Ok(Message::Binary(data)) => {
                warn!(doc_id = %doc_id, n_bytes = data.len(), "Discarding binary message");
                continue;
            }
            Ok(Message::Close(_)) => {
                info!(doc_id = %doc_id, "Editor closed map");
                break;
            }
            // Pings are answered by axum
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                error!(doc_id = %doc_id, "Error reading editor message: {}", e);
                break;
            }
        }
    }

    drop(editor);
    if let Err(e) = state.registry.end_edit(&doc_id).await {
        warn!(doc_id = %doc_id, "Failed to end edit session: {}", e);
    }
}
