use std::sync::Arc;
use axum::{
    extract::{Path, State, ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug};

use crate::{session::RegistryError, AppState};

/// WebSocket endpoint of a viewer following a battle map
pub async fn view_handler(
    Path(doc_id): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!(doc_id = %doc_id, "New viewer connection attempt");
    ws.on_upgrade(move |socket| handle_viewer(socket, doc_id, state))
}

/// Relay every snapshot of the session to the viewer's socket
async fn handle_viewer(mut socket: WebSocket, doc_id: String, state: Arc<AppState>) {

    let mut viewer = match state.registry.begin_view(&doc_id).await {
        Ok(viewer) => viewer,
        Err(e) => {
            warn!(doc_id = %doc_id, "Refusing viewer: {}", e);
            let close = CloseFrame { code: close_code::POLICY, reason: e.to_string().into() };
            let _ = socket.send(Message::Close(Some(close))).await;
            return;
        }
    };
    let viewer_id = viewer.id();
    info!(doc_id = %doc_id, viewer_id = %viewer_id, "Viewer joined");

    let (mut sender, mut receiver) = socket.split();

    let session_ended = loop {
        tokio::select! {
            snapshot = viewer.recv() => {
                let Some(snapshot) = snapshot else {
                    break true;
                };

                let text = match serde_json::to_string(snapshot.as_ref()) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(doc_id = %doc_id, "Failed to encode battle map: {}", e);
                        continue;
                    }
                };

                debug!(doc_id = %doc_id, viewer_id = %viewer_id, "Sending update");
                if let Err(e) = sender.send(Message::Text(text)).await {
                    debug!(doc_id = %doc_id, viewer_id = %viewer_id, "Viewer socket failed: {}", e);
                    break false;
                }
            }

            // Viewers only listen, anything but a close is ignored
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break false,
                    Some(Err(e)) => {
                        debug!(doc_id = %doc_id, viewer_id = %viewer_id, "Viewer socket error: {}", e);
                        break false;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    };

    if session_ended {
        info!(doc_id = %doc_id, viewer_id = %viewer_id, "Session ended, closing viewer");
        let close = CloseFrame { code: close_code::NORMAL, reason: "edit session ended".into() };
        let _ = sender.send(Message::Close(Some(close))).await;
        return;
    }

    // Release a broadcast possibly waiting on this viewer before taking the session lock
    drop(viewer);
    match state.registry.end_view(&doc_id, viewer_id).await {
        Ok(()) => info!(doc_id = %doc_id, viewer_id = %viewer_id, "Viewer left"),
        Err(RegistryError::ViewerNotFound) | Err(RegistryError::NotExists) => {
            debug!(doc_id = %doc_id, viewer_id = %viewer_id, "Viewer already removed");
        }
        Err(e) => error!(doc_id = %doc_id, viewer_id = %viewer_id, "Error ending view: {}", e),
    }
}
