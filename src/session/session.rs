use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Snapshot;
use super::RegistryError;

/// Identity of one viewer subscription within a session
pub type ViewerId = Uuid;

/// Receiving side of a viewer subscription.
///
/// Yields every snapshot published after joining, starting with the one
/// current at join time. `recv` returns `None` once the session has ended.
#[derive(Debug)]
pub struct ViewerHandle {
    id: ViewerId,
    rx: mpsc::Receiver<Snapshot>,
}

impl ViewerHandle {
    pub fn id(&self) -> ViewerId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

struct Viewer {
    id: ViewerId,
    tx: mpsc::Sender<Snapshot>,
}

#[derive(Default)]
struct SessionState {
    last_snapshot: Option<Snapshot>,
    viewers: Vec<Viewer>,
    closed: bool,
}

/// Live editing session of one document.
///
/// Owns the receiving side of the editor channel through its broadcast loop
/// and fans every snapshot out to the registered viewers.
pub struct Session {
    doc_id: String,
    viewer_buffer: usize,
    state: Arc<Mutex<SessionState>>,
    shutdown: Arc<Notify>,
}

impl Session {
    /// Create a session and spawn its broadcast loop.
    ///
    /// Returns the session together with the sending side of the editor channel.
    pub fn start(doc_id: &str, viewer_buffer: usize) -> (Self, mpsc::Sender<Snapshot>) {
        let (editor_tx, editor_rx) = mpsc::channel::<Snapshot>(1);
        let shutdown = Arc::new(Notify::new());
        let state = Arc::new(Mutex::new(SessionState::default()));

        tokio::spawn(run(doc_id.to_string(), editor_rx, shutdown.clone(), state.clone()));

        let session = Session {
            doc_id: doc_id.to_string(),
            viewer_buffer: viewer_buffer.max(1),
            state,
            shutdown,
        };
        (session, editor_tx)
    }

    /// Close the editor channel.
    ///
    /// Snapshots already queued are still broadcast, then every viewer is closed.
    pub fn close(&self) {
        // Stored as a permit when the loop is not waiting yet.
        self.shutdown.notify_one();
    }

    /// Register a viewer, replaying the current snapshot as its first value.
    ///
    /// Fails with `NotExists` once the broadcast loop has ended.
    pub async fn add_viewer(&self) -> Result<ViewerHandle, RegistryError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(RegistryError::NotExists);
        }

        let (tx, rx) = mpsc::channel(self.viewer_buffer);
        if let Some(snapshot) = &state.last_snapshot {
            // Fresh channel with capacity >= 1, cannot be full.
            let _ = tx.try_send(snapshot.clone());
        }

        let id = Uuid::new_v4();
        state.viewers.push(Viewer { id, tx });
        debug!(doc_id = %self.doc_id, viewer_id = %id, n_viewers = state.viewers.len(), "Viewer added");

        Ok(ViewerHandle { id, rx })
    }

    /// Unregister a viewer and close its channel.
    pub async fn remove_viewer(&self, viewer_id: ViewerId) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;

        let pos = state
            .viewers
            .iter()
            .position(|v| v.id == viewer_id)
            .ok_or(RegistryError::ViewerNotFound)?;
        state.viewers.swap_remove(pos);
        debug!(doc_id = %self.doc_id, viewer_id = %viewer_id, n_viewers = state.viewers.len(), "Viewer removed");

        Ok(())
    }

    pub async fn viewer_count(&self) -> usize {
        self.state.lock().await.viewers.len()
    }
}

#[cfg(test)]
impl Session {
    pub(crate) async fn has_snapshot(&self) -> bool {
        self.state.lock().await.last_snapshot.is_some()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Broadcast loop of a session.
///
/// Delivery to a full viewer buffer waits while holding the session lock, so a
/// stalled viewer holds back the other viewers of the same document.
async fn run(
    doc_id: String,
    mut editor_rx: mpsc::Receiver<Snapshot>,
    shutdown: Arc<Notify>,
    state: Arc<Mutex<SessionState>>,
) {
    info!(doc_id = %doc_id, "Session started");

    let mut closing = false;
    loop {
        let next = if closing {
            editor_rx.recv().await
        } else {
            tokio::select! {
                next = editor_rx.recv() => next,
                _ = shutdown.notified() => {
                    // Drain what is already queued, reject anything new.
                    editor_rx.close();
                    closing = true;
                    continue;
                }
            }
        };

        let Some(snapshot) = next else {
            break;
        };

        let mut state = state.lock().await;
        state.last_snapshot = Some(snapshot.clone());

        let mut gone = Vec::new();
        for viewer in state.viewers.iter() {
            if viewer.tx.send(snapshot.clone()).await.is_err() {
                gone.push(viewer.id);
            }
        }
        if !gone.is_empty() {
            debug!(doc_id = %doc_id, n_gone = gone.len(), "Pruning viewers that stopped receiving");
            state.viewers.retain(|v| !gone.contains(&v.id));
        }
    }

    // Dropping the senders closes every viewer channel.
    let mut state = state.lock().await;
    let n_viewers = state.viewers.len();
    state.closed = true;
    state.viewers.clear();
    info!(doc_id = %doc_id, n_viewers, "Session ended");
}
