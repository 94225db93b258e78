//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, event store selection, worker spawning,
//! collaborator wiring and the Axum server lifecycle.

use crate::application::services::{OpenEventRegistrar, RedirectResolver, RedirectService};
use crate::config::Config;
use crate::domain::collaborators::{RobotFilter, TelemetrySink};
use crate::domain::duplicate_window::DuplicateWindowPolicy;
use crate::domain::open_worker::run_open_worker;
use crate::domain::repositories::EmailEventStorage;
use crate::infrastructure::enrichment::HeaderCaptureEnricher;
use crate::infrastructure::event_store::{InMemoryEventStorage, RedisEventStorage};
use crate::infrastructure::persistence::{PgMessageRepository, PgOpenEventRepository};
use crate::infrastructure::redirect_steps::{ForwardQueryStep, ParseTargetStep};
use crate::infrastructure::robots::{DEFAULT_ROBOT_PATTERNS, UserAgentRobotFilter};
use crate::infrastructure::telemetry::QueueTelemetrySink;
use crate::infrastructure::tracking::CookieTrackerProvider;
use crate::routes::app_router;
use crate::state::{AppState, TrackingSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis event store (or in-memory fallback)
/// - Background open-event worker
/// - Redirect orchestrator and its collaborators
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - A robot pattern is not a valid regex
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let event_storage = event_storage(&config).await;

    let pool = Arc::new(pool);
    let message_repository = Arc::new(PgMessageRepository::new(pool.clone()));
    let open_event_repository = Arc::new(PgOpenEventRepository::new(pool));

    let (open_tx, open_rx) = mpsc::channel(config.open_queue_capacity);
    tokio::spawn(run_open_worker(
        open_rx,
        open_event_repository,
        config.open_worker_concurrency,
    ));
    tracing::info!("Open worker started");

    let open_sink = QueueTelemetrySink::new(open_tx);
    let redirect_service = redirect_service(&config, event_storage.clone(), &open_sink)?;

    let state = AppState {
        redirect_service: Arc::new(redirect_service),
        message_repository,
        event_storage,
        tracker_provider: Arc::new(CookieTrackerProvider::new(
            config.analytics_cookie_name.clone(),
        )),
        open_sink,
        settings: Arc::new(TrackingSettings {
            enabled: config.exm_enabled,
            site_name: config.site_name.clone(),
            behind_proxy: config.behind_proxy,
        }),
    };

    if !config.exm_enabled {
        tracing::warn!("Tracking endpoint disabled (EXM_ENABLED=false)");
    }

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Picks the Redis event store when configured, the in-memory store otherwise.
async fn event_storage(config: &Config) -> Arc<dyn EmailEventStorage> {
    if let Some(redis_url) = &config.redis_url {
        match RedisEventStorage::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Event store: Redis");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory event store.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Event store: in-memory");
    }

    Arc::new(InMemoryEventStorage::new())
}

/// Wires the orchestrator from configuration.
fn redirect_service(
    config: &Config,
    event_storage: Arc<dyn EmailEventStorage>,
    open_sink: &QueueTelemetrySink,
) -> Result<RedirectService> {
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(open_sink.clone());
    let mut registrar = OpenEventRegistrar::new(
        event_storage,
        telemetry,
        DuplicateWindowPolicy::from_secs(config.duplicate_protection_interval),
    )
    .with_store_timeout(Duration::from_millis(config.store_timeout_ms));

    if !config.open_event_capture_headers.is_empty() {
        registrar = registrar.with_enricher(Arc::new(HeaderCaptureEnricher::new(
            config.open_event_capture_headers.iter(),
        )));
    }

    let resolver = RedirectResolver::default()
        .with_step(Arc::new(ParseTargetStep))
        .with_step(Arc::new(ForwardQueryStep::new(
            config.forward_query_prefixes.clone(),
        )));
    tracing::info!("Redirect pipeline: {:?}", resolver.step_names());

    let excluded_ips = config.robot_excluded_ips.clone();
    let robot_filter: Arc<dyn RobotFilter> = match &config.robot_user_agent_patterns {
        Some(patterns) => Arc::new(
            UserAgentRobotFilter::new(patterns, excluded_ips)
                .context("Invalid ROBOT_USER_AGENT_PATTERNS")?,
        ),
        None => Arc::new(
            UserAgentRobotFilter::new(DEFAULT_ROBOT_PATTERNS, excluded_ips)
                .context("Invalid built-in robot patterns")?,
        ),
    };

    Ok(RedirectService::new(
        registrar,
        resolver,
        robot_filter,
        config.item_not_found_url.clone(),
    )
    .with_resolver_timeout(Duration::from_millis(config.resolver_timeout_ms)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
