//! `student-registry` entry point.
//!
//! # Responsibility
//! - Load configuration, start logging, open the session factory once.
//! - Serve until Ctrl-C, then drain requests and shut the factory down.

mod config;

use anyhow::{anyhow, Context};
use clap::Parser;
use config::Config;
use log::info;
use std::sync::Arc;
use student_api::{serve, shutdown_signal, AppState};
use student_core::{init_logging, SessionFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    init_logging(config.effective_log_level(), config.log_dir.as_deref())
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;
    info!(
        "event=startup module=cli status=start version={}",
        student_core::core_version()
    );

    let sessions = Arc::new(SessionFactory::open(&config.database).with_context(|| {
        format!("failed to open database `{}`", config.database.display())
    })?);

    let database = sessions
        .path()
        .map_or_else(|| "memory".to_string(), |path| path.display().to_string());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=startup module=cli status=ok bind={} database={}",
        config.bind, database
    );

    let served = serve(listener, AppState::new(Arc::clone(&sessions)), shutdown_signal()).await;
    sessions.shutdown();
    served.context("server failed")?;

    info!("event=shutdown module=cli status=ok");
    Ok(())
}
