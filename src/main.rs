mod models;
mod handlers;
mod routes;
mod docs;
mod config;
mod services;
mod session;
mod websocket;

use config::Config;
use routes::create_router;
use services::battlemap_service::BattleMapStore;
use session::SessionRegistry;
use std::panic;
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uuid::Uuid;

/// State shared by all handlers
pub struct AppState {
    pub config: Config,
    pub jwt_secret: String,
    pub registry: SessionRegistry,
    pub store: BattleMapStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let jwt_secret = match &config.auth_jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("No auth JWT secret configured - generating one, issued tokens will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };
        let registry = SessionRegistry::new(config.viewer_buffer);

        Self {
            config,
            jwt_secret,
            registry,
            store: BattleMapStore::new(),
        }
    }
}

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration before tracing so the configured level is the default
    let loaded = Config::load();
    let log_level = loaded.as_ref().map(|c| c.log_level.clone()).unwrap_or_else(|_| "info".to_string());

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to the configured level, but allow debug for our app
            format!("battlemap_server=debug,tower_http=debug,axum::rejection=trace,{}", log_level).into()
        }))
        .init();

    info!("Starting server...");

    // Reported only now that the subscriber is installed
    let config = loaded.inspect(|_| info!("Configuration loaded")).unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    info!(environment = %config.environment, viewer_buffer = config.viewer_buffer, "Configuration in effect");
    if !config.is_development() && config.auth_jwt_secret.is_none() {
        warn!("AUTH_JWT_SECRET should be set outside of development");
    }

    let address = config.server_address();
    let state = Arc::new(AppState::new(config));
    let app_routes = create_router(state);

    // Start the HTTP/API server
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", address, e);
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", address);
    info!("📡 WebSocket available at ws://{}/ws/{{edit,view}}/:id", address);
    info!("📚 Swagger UI available at http://{}/swagger", address);

    let exit_code = match axum::serve(listener, app_routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        Ok(()) => 0,
        Err(e) => {
            error!("Server failed: {}", e);
            1
        }
    };

    info!(code = exit_code, "Exit");
    std::process::exit(exit_code);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "Received signal"),
        _ = terminate => info!(signal = "SIGTERM", "Received signal"),
    }
}
