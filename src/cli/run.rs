use crate::api::HttpLogApi;
use crate::config::parse::load_config;
use crate::config::types::Config;
use crate::engine::{Engine, EngineSettings};
use crate::event::{codec_for, Decorator, EventBuilder};
use crate::position::{resolve_position_path, PositionStore};
use crate::sink::{create_channel, run_writer};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("position store error: {0}")]
    Position(#[from] crate::position::PositionError),

    #[error("api client error: {0}")]
    Api(#[from] crate::api::ApiError),

    #[error("engine error: {0}")]
    Engine(#[from] crate::engine::EngineError),

    #[error("writer error: {0}")]
    Writer(#[from] crate::sink::SinkError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("config not found; use --config <path> or run 'cwingest config init'")]
    ConfigNotFound,
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), RunError> {
    let config_path = config_path.ok_or(RunError::ConfigNotFound)?;
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(&config_path)?;

    run_engine(config).await
}

/// Print the stored position of every source.
pub fn positions(config_path: Option<PathBuf>) -> Result<(), RunError> {
    let config_path = config_path.ok_or(RunError::ConfigNotFound)?;
    let config = load_config(&config_path)?;
    let store = PositionStore::load(position_path(&config)?);

    println!("# {}", store.path().display());
    for (source, cursor) in store.iter() {
        println!("{} {}", source, cursor);
    }
    Ok(())
}

fn position_path(config: &Config) -> Result<PathBuf, RunError> {
    Ok(resolve_position_path(
        config.input.sincedb_path.as_deref(),
        config.input.data_dir.as_deref(),
        &config.input.log_group,
        |key| std::env::var(key).ok(),
    )?)
}

async fn run_engine(config: Config) -> Result<(), RunError> {
    let path = position_path(&config)?;
    info!(path = %path.display(), "Loading positions");
    let positions = PositionStore::load(&path);

    let api = Arc::new(HttpLogApi::new(&config.api)?);
    info!(endpoint = %api.endpoint(), "Using log API endpoint");

    let builder = EventBuilder::new(
        codec_for(config.input.codec),
        Decorator::from_config(&config.input),
    );
    let (sink, events_rx) = create_channel(config.output.buffer_limit);

    let writer_handle = tokio::spawn(run_writer(
        events_rx,
        tokio::io::BufWriter::new(tokio::io::stdout()),
    ));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let mut engine = Engine::new(
        api,
        Arc::new(sink),
        builder,
        EngineSettings::from_config(&config.input),
        positions,
    );

    info!("Engine started, press Ctrl+C to shutdown");
    let engine_result = engine.run(shutdown).await;
    let final_positions = engine.positions().len();

    // Dropping the engine drops the last sender so the writer can finish.
    drop(engine);

    match writer_handle.await? {
        Ok(count) => info!(events = count, "Writer finished"),
        Err(e) => error!(error = %e, "Writer error"),
    }

    engine_result?;
    info!(sources = final_positions, "Shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "Shutdown signal received"),
        _ = sigterm.recv() => info!(signal = "SIGTERM", "Shutdown signal received"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
