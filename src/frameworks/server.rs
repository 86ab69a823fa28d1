// Framework bootstrap for the playback server runtime.

use crate::domain::ports::{Clock, PlaySessionStore};
use crate::frameworks::{config, db};
use crate::interface_adapters::clients::GcsStorageClient;
use crate::interface_adapters::postgres_store::PostgresSessionStore;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, InMemorySessionStore, SystemClock};
use crate::use_cases::sweep_stale::SweepStaleSessionsUseCase;

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the HTTP routes on an already-bound listener with prebuilt state.
pub async fn run(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener.local_addr()?;
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let state = build_state().await?;
    spawn_sweeper(&state);

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    // Bind TCP listener with error handling.
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state).await
}

async fn build_state() -> Result<Arc<AppState>> {
    let sessions = build_session_store().await?;

    let bucket = config::storage_bucket().map_err(std::io::Error::other)?;
    let host = config::storage_host();
    let timeout = config::storage_request_timeout();
    let service_account_json =
        config::storage_service_account_json().map_err(std::io::Error::other)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let storage =
        GcsStorageClient::new(&service_account_json, bucket, host.clone(), timeout, clock.clone())
            .map_err(|e| {
                std::io::Error::other(format!("failed to initialize storage client: {e}"))
            })?;
    tracing::debug!(
        bucket = %storage.bucket(),
        host = %host,
        timeout_ms = timeout.as_millis(),
        "storage client configured"
    );

    Ok(Arc::new(AppState {
        sessions,
        storage: Arc::new(storage),
        clock,
        asset_layout: config::episode_asset_layout(),
    }))
}

async fn build_session_store() -> Result<Arc<dyn PlaySessionStore>> {
    let Some(database_url) = config::database_url() else {
        tracing::warn!("DATABASE_URL not set; playback sessions are kept in memory");
        return Ok(Arc::new(InMemorySessionStore::default()));
    };

    let pool = db::connect_pool(&database_url, config::database_max_connections())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to connect to database");
            std::io::Error::other(e)
        })?;

    db::run_migrations(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "failed to run migrations");
        std::io::Error::other(e)
    })?;

    Ok(Arc::new(PostgresSessionStore { db: pool }))
}

fn spawn_sweeper(state: &AppState) {
    let stale_after_seconds = config::session_stale_after_seconds();
    if stale_after_seconds == 0 {
        tracing::info!("stale session sweeper disabled");
        return;
    }

    let interval = config::session_sweep_interval();
    tracing::debug!(
        stale_after_seconds,
        interval_secs = interval.as_secs(),
        "stale session sweeper configured"
    );

    // Detached; lives as long as the runtime.
    let _ = SweepStaleSessionsUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
        stale_after_seconds,
    }
    .spawn(interval);
}
