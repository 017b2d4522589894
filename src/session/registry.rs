use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::models::Snapshot;
use super::{RegistryError, Session, ViewerHandle, ViewerId};

/// Default number of snapshots a viewer may have pending
pub const DEFAULT_VIEWER_BUFFER: usize = 10;

/// Live sessions by document id.
///
/// The registry lock only guards membership and is never held while waiting
/// on a session lock. Callers clone the session out of the map first, so a
/// stalled document cannot block operations on other documents.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    viewer_buffer: usize,
}

impl SessionRegistry {
    pub fn new(viewer_buffer: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            viewer_buffer,
        }
    }

    /// Start a session for `doc_id`. The caller becomes its only editor.
    pub async fn begin_edit(&self, doc_id: &str) -> Result<mpsc::Sender<Snapshot>, RegistryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(doc_id) {
            warn!(doc_id = %doc_id, "Conflict: document already has an editor");
            return Err(RegistryError::AlreadyExists);
        }

        let (session, editor_tx) = Session::start(doc_id, self.viewer_buffer);
        sessions.insert(doc_id.to_string(), Arc::new(session));
        info!(doc_id = %doc_id, n_sessions = sessions.len(), "Edit session begun");

        Ok(editor_tx)
    }

    /// End the session for `doc_id`, disconnecting all of its viewers.
    pub async fn end_edit(&self, doc_id: &str) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.remove(doc_id).ok_or(RegistryError::NotExists)?;
        session.close();
        info!(doc_id = %doc_id, n_sessions = sessions.len(), "Edit session ended");
        Ok(())
    }

    /// Subscribe to the live session for `doc_id`.
    ///
    /// A session ended concurrently still reports `NotExists`.
    pub async fn begin_view(&self, doc_id: &str) -> Result<ViewerHandle, RegistryError> {
        let session = self.get(doc_id).await?;
        session.add_viewer().await
    }

    /// Cancel a subscription obtained from [`begin_view`](Self::begin_view).
    pub async fn end_view(&self, doc_id: &str, viewer_id: ViewerId) -> Result<(), RegistryError> {
        let session = self.get(doc_id).await?;
        session.remove_viewer(viewer_id).await
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn viewer_count(&self) -> usize {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let mut n = 0;
        for session in sessions {
            n += session.viewer_count().await;
        }
        n
    }

    async fn get(&self, doc_id: &str) -> Result<Arc<Session>, RegistryError> {
        self.sessions
            .read()
            .await
            .get(doc_id)
            .cloned()
            .ok_or(RegistryError::NotExists)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWER_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BattleMap, Shape, ShapeType};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next(handle: &mut ViewerHandle) -> Option<Snapshot> {
        timeout(Duration::from_secs(1), handle.recv())
            .await
            .expect("viewer channel neither delivered nor closed")
    }

    #[tokio::test]
    async fn begin_edit_on_distinct_ids_succeeds() {
        let registry = SessionRegistry::default();

        let _a = registry.begin_edit("a").await.unwrap();
        let _b = registry.begin_edit("b").await.unwrap();
        assert_eq!(registry.session_count().await, 2);

        registry.end_edit("a").await.unwrap();
        registry.end_edit("b").await.unwrap();
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn second_editor_is_rejected_until_first_ends() {
        let registry = SessionRegistry::default();

        let _editor = registry.begin_edit("map1").await.unwrap();
        assert!(matches!(
            registry.begin_edit("map1").await,
            Err(RegistryError::AlreadyExists)
        ));

        registry.end_edit("map1").await.unwrap();
        assert!(registry.begin_edit("map1").await.is_ok());
    }

    #[tokio::test]
    async fn operations_on_unknown_id_fail_with_not_exists() {
        let registry = SessionRegistry::default();

        assert!(matches!(registry.end_edit("nope").await, Err(RegistryError::NotExists)));
        assert!(matches!(registry.begin_view("nope").await, Err(RegistryError::NotExists)));
        assert!(matches!(
            registry.end_view("nope", ViewerId::new_v4()).await,
            Err(RegistryError::NotExists)
        ));
    }

    #[tokio::test]
    async fn end_view_with_unknown_handle_fails_with_viewer_not_found() {
        let registry = SessionRegistry::default();
        let _editor = registry.begin_edit("map1").await.unwrap();

        assert!(matches!(
            registry.end_view("map1", ViewerId::new_v4()).await,
            Err(RegistryError::ViewerNotFound)
        ));

        let viewer = registry.begin_view("map1").await.unwrap();
        registry.end_view("map1", viewer.id()).await.unwrap();
        assert!(matches!(
            registry.end_view("map1", viewer.id()).await,
            Err(RegistryError::ViewerNotFound)
        ));
    }

    #[tokio::test]
    async fn end_edit_closes_every_viewer() {
        let registry = SessionRegistry::default();
        let _editor = registry.begin_edit("map1").await.unwrap();
        let mut v1 = registry.begin_view("map1").await.unwrap();
        let mut v2 = registry.begin_view("map1").await.unwrap();
        assert_eq!(registry.viewer_count().await, 2);

        registry.end_edit("map1").await.unwrap();

        assert!(next(&mut v1).await.is_none());
        assert!(next(&mut v2).await.is_none());
    }

    /// Wait until the broadcast loop has stored a snapshot for `doc_id`.
    ///
    /// The editor channel holds one queued snapshot, so `send` can return
    /// before the loop has picked it up.
    async fn wait_until_published(registry: &SessionRegistry, doc_id: &str) {
        let session = registry.get(doc_id).await.unwrap();
        timeout(Duration::from_secs(1), async {
            while !session.has_snapshot().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("snapshot was never published");
    }

    #[tokio::test]
    async fn edit_view_lifecycle() {
        let registry = SessionRegistry::default();
        let editor = registry.begin_edit("map1").await.unwrap();

        let first = Arc::new(BattleMap {
            id: "map1".to_string(),
            grid: true,
            ..Default::default()
        });
        editor.send(first.clone()).await.unwrap();
        wait_until_published(&registry, "map1").await;

        let mut viewer = registry.begin_view("map1").await.unwrap();
        assert_eq!(next(&mut viewer).await.unwrap(), first);

        let update = Arc::new(BattleMap {
            id: "map1".to_string(),
            grid: true,
            tokens: vec![Shape {
                id: "t1".to_string(),
                kind: ShapeType::Token,
                ..Default::default()
            }],
            ..Default::default()
        });
        editor.send(update.clone()).await.unwrap();
        assert_eq!(next(&mut viewer).await.unwrap(), update);

        registry.end_edit("map1").await.unwrap();
        assert!(next(&mut viewer).await.is_none());
        assert!(matches!(registry.begin_view("map1").await, Err(RegistryError::NotExists)));
    }

    #[tokio::test]
    async fn stalled_viewer_does_not_block_other_documents() {
        let registry = SessionRegistry::new(1);
        let editor = registry.begin_edit("a").await.unwrap();
        let stalled = registry.begin_view("a").await.unwrap();

        // The first snapshot fills the viewer buffer, the loop then blocks on
        // the second while holding the session lock.
        for id in ["s1", "s2", "s3"] {
            editor
                .send(Arc::new(BattleMap { id: id.to_string(), ..Default::default() }))
                .await
                .unwrap();
        }

        // Waits on the session lock of "a".
        let pending = tokio::spawn({
            let registry = registry.clone();
            async move { registry.begin_view("a").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        let _other = timeout(Duration::from_secs(1), registry.begin_edit("b"))
            .await
            .expect("begin_edit on another document hung")
            .unwrap();
        let _other_viewer = timeout(Duration::from_secs(1), registry.begin_view("b"))
            .await
            .expect("begin_view on another document hung")
            .unwrap();
        assert_eq!(registry.session_count().await, 2);

        // Releasing the stalled viewer lets the loop and the pending join finish.
        drop(stalled);
        let joined = timeout(Duration::from_secs(1), pending).await.unwrap().unwrap();
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn view_of_ended_session_fails_with_not_exists() {
        let registry = SessionRegistry::default();
        let _editor = registry.begin_edit("map1").await.unwrap();
        let session = registry.get("map1").await.unwrap();

        registry.end_edit("map1").await.unwrap();

        // A caller that looked the session up just before it ended.
        if let Ok(mut viewer) = session.add_viewer().await {
            // Teardown had not run yet; the channel still closes.
            assert!(next(&mut viewer).await.is_none());
        }
        assert!(matches!(session.add_viewer().await, Err(RegistryError::NotExists)));
    }
}
