use crate::{models::DiagnosticsResponse, AppState};
use axum::{extract::State, Json};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Report live sessions and process resources
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
) -> Json<DiagnosticsResponse> {

    let n_sessions = state.registry.session_count().await as u32;
    let n_viewers = state.registry.viewer_count().await as u32;
    let n_stored_maps = state.store.count().await as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Sessions: {}, Viewers: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_sessions,
        n_viewers
    );

    Json(DiagnosticsResponse {
        n_sessions,
        n_viewers,
        n_stored_maps,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
