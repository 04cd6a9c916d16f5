//! Task list API server.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: `5`)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `info`, `todo_list_api=debug`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)
//! - `DEFAULT_PAGE_SIZE` / `MAX_PAGE_SIZE`: Paging limits (default: `20` / `100`)

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_list_api::api::{AppConfig, AppState, router};
use todo_list_api::config::{DEFAULT_LOG_FILTER, LogFormat, ServerConfig};
use todo_list_api::infrastructure::{RepositoryConfig, RepositoryFactory};
use todo_list_api::service::TaskService;

fn main() {
    dotenvy::dotenv().ok();

    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    match (
        server_config.worker_threads,
        server_config.effective_worker_threads(),
    ) {
        (Some(requested), Some(threads)) => {
            if threads < requested {
                eprintln!(
                    "Warning: WORKER_THREADS={requested} exceeds recommended limit ({threads}), capping to {threads}"
                );
            }
            builder.worker_threads(threads);
            eprintln!("Tokio worker_threads set to: {threads}");
        }
        _ => eprintln!("Tokio worker_threads: using default (logical CPU count)"),
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main(server_config));
}

fn init_tracing(format: LogFormat) {
    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(pretty)
        .with(json)
        .init();
}

async fn async_main(server_config: ServerConfig) {
    init_tracing(LogFormat::from_env());

    tracing::info!("Starting Todo List API");

    let repository_config = match RepositoryConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = ?repository_config.storage_mode,
        default_page_size = app_config.default_page_size,
        max_page_size = app_config.max_page_size,
        "Configuration loaded"
    );

    let repository = match RepositoryFactory::new(repository_config).create().await {
        Ok(repository) => {
            tracing::info!("Repository initialized successfully");
            repository
        }
        Err(error) => {
            tracing::error!("Failed to initialize repository: {}", error);
            std::process::exit(1);
        }
    };

    let application_state = AppState::new(TaskService::new(repository), app_config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let application = router(application_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let address = match server_config.socket_address() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on Ctrl+C, or on SIGTERM where supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
