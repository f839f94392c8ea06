//! Backend entry-point: loads configuration, prepares storage, and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::inbound::http::session_config::{BuildMode, SessionSettings};
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr(), settings.media_root())
        .with_media_url(settings.media_url())
        .with_max_image_bytes(settings.max_image_bytes());

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .await
            .wrap_err("database migrations failed")?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    } else if let Some((email, password)) = settings.demo_user() {
        config = config.with_demo_user(email, password);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(addr = %settings.bind_addr(), "listening");
    server.await.wrap_err("server terminated unexpectedly")
}
