use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::models::BattleMap;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("not allowed to update battle map")]
    Forbidden,
    #[error("battle map does not exist")]
    NotExists,
}

struct Entry {
    data: BattleMap,
    last_modified: DateTime<Utc>,
    user_id: String,
}

/// In-memory battle maps served by the REST API.
///
/// The first user to store a map owns it; later updates from anyone else are rejected.
#[derive(Clone, Default)]
pub struct BattleMapStore {
    maps: Arc<RwLock<HashMap<String, Arc<Mutex<Entry>>>>>,
}

impl BattleMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, user_id: &str, data: BattleMap) -> Result<(), StoreError> {
        let entry = {
            let mut maps = self.maps.write().await;
            maps.entry(data.id.clone())
                .or_insert_with(|| {
                    info!(map_id = %data.id, user_id = %user_id, "Battle map created");
                    Arc::new(Mutex::new(Entry {
                        data: BattleMap::default(),
                        last_modified: Utc::now(),
                        user_id: user_id.to_string(),
                    }))
                })
                .clone()
        };

        let mut entry = entry.lock().await;
        if entry.user_id != user_id {
            warn!(map_id = %data.id, user_id = %user_id, "Rejected update of foreign battle map");
            return Err(StoreError::Forbidden);
        }

        debug!(map_id = %data.id, "Battle map updated");
        entry.data = data;
        entry.last_modified = Utc::now();
        Ok(())
    }

    pub async fn load(&self, id: &str) -> Result<(BattleMap, DateTime<Utc>), StoreError> {
        let entry = {
            let maps = self.maps.read().await;
            maps.get(id).cloned().ok_or(StoreError::NotExists)?
        };

        let entry = entry.lock().await;
        Ok((entry.data.clone(), entry.last_modified))
    }

    pub async fn count(&self) -> usize {
        self.maps.read().await.len()
    }
}
