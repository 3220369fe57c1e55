//! Service entry-point: wires settings, the database pool, the imagery
//! adapter, and the REST endpoints together.

use std::env;
use std::sync::Arc;

use actix_web::{HttpServer, web};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use diesel_async::RunQueryDsl;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hectare::domain::FieldService;
use hectare::inbound::http::health::HealthState;
use hectare::inbound::http::state::HttpState;
use hectare::outbound::imagery::ThumbnailHttpSource;
use hectare::outbound::persistence::{DbPool, DieselFieldRepository, PoolConfig};
use hectare::server::{AppSettings, build_app};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let database_url = settings.database_url();
    run_migrations(database_url.clone()).await?;

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
    )
    .await
    .map_err(std::io::Error::other)?;
    info!(healthy = database_health(&pool).await, "database health check");

    let endpoint = Url::parse(&settings.imagery_endpoint())
        .map_err(|err| std::io::Error::other(format!("invalid imagery endpoint: {err}")))?;
    let thumbnails = ThumbnailHttpSource::new(
        endpoint,
        settings.imagery_timeout(),
        settings.imagery_api_key.clone(),
    )
    .map_err(std::io::Error::other)?;

    let service = Arc::new(FieldService::new(
        Arc::new(DieselFieldRepository::new(pool)),
        Arc::new(thumbnails),
        Arc::new(DefaultClock),
        settings.freshness_window(),
    ));
    let http_state = web::Data::new(HttpState::new(
        service.clone(),
        service.clone(),
        service,
    ));

    let health_state = web::Data::new(HealthState::new());
    let server_http_state = http_state.clone();
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_http_state.clone(), server_health_state.clone())
    })
    .bind(settings.bind_addr())?;

    health_state.mark_ready();
    info!(bind_addr = %settings.bind_addr(), "hectare backend listening");
    server.run().await
}

/// Run pending migrations on a blocking thread; Diesel's migration harness
/// is synchronous.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || -> Result<(), String> {
        let mut conn = PgConnection::establish(&database_url).map_err(|err| err.to_string())?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
    .await
    .map_err(|err| std::io::Error::other(err.to_string()))?
    .map_err(std::io::Error::other)
}

/// One `SELECT 1` round-trip so startup logs whether the store is reachable.
async fn database_health(pool: &DbPool) -> bool {
    match pool.get().await {
        Ok(mut conn) => diesel::sql_query("SELECT 1").execute(&mut conn).await.is_ok(),
        Err(_) => false,
    }
}
