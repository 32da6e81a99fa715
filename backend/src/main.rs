//! Backend entry-point: loads settings, prepares the store and serves the
//! survey REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use survey_backend::inbound::http::health::HealthState;
use survey_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use survey_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load_from_iter(std::env::args_os()).wrap_err("failed to load settings")?;
    let mut config = ServerConfig::new(
        settings.bind_addr()?,
        settings.app_name(),
        settings.jwt_secret()?,
        settings.jwt_audience(),
    )
    .with_request_timeout(settings.request_timeout()?)
    .with_debug(settings.debug);

    match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .wrap_err("failed to migrate database")?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
                .await
                .wrap_err("failed to build database pool")?;
            pool.ping().await.wrap_err("database unreachable")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; data lives in memory and is lost on restart"),
    }

    info!(addr = %config.bind_addr(), app = settings.app_name(), "starting server");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
