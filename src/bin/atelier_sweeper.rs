//! Runs the system event sweep against a `PostgreSQL` database.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://... atelier_sweeper
//! ```
//!
//! The sweep interval and batch size are read from
//! `ATELIER_SWEEP_INTERVAL_SECS` and `ATELIER_SWEEP_BATCH_SIZE`. Log output is
//! filtered through `RUST_LOG` and defaults to `info`. The process sweeps
//! once at start-up, then on every interval until it receives Ctrl-C.

use atelier::audit::adapters::postgres::PostgresAuditStore;
use atelier::audit::services::{AuditPipeline, SweepStart};
use atelier::config::{ConfigError, PipelineConfig};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Errors that stop the sweeper from starting.
#[derive(Debug, Error)]
enum SweeperError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build connection pool: {0}")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("failed to initialize runtime: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to start sweep: {0}")]
    Sweep(#[from] atelier::audit::services::SweepError),
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    run().map_err(Into::into)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn run() -> Result<(), SweeperError> {
    let config = PipelineConfig::from_env()?;
    let database_url =
        std::env::var(DATABASE_URL_ENV).map_err(|_| SweeperError::MissingDatabaseUrl)?;
    let pool = Pool::builder()
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .map_err(SweeperError::Pool)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SweeperError::RuntimeInit)?;

    runtime.block_on(async move {
        let store = Arc::new(PostgresAuditStore::new(pool));
        let pipeline = AuditPipeline::new(
            Arc::clone(&store),
            store,
            Arc::new(DefaultClock),
            &config,
        );
        if pipeline.sweep().ensure_started()? == SweepStart::AlreadyRunning {
            tracing::warn!("sweep was already running at start-up");
        }
        let signal = tokio::signal::ctrl_c().await.map_err(SweeperError::Signal);
        tracing::info!("shutdown requested");
        pipeline.sweep().shutdown().await;
        signal
    })
}
