mod chat;
mod config;
mod console;
mod fallback;
mod models;
mod services;
mod session;
mod status;
mod storage;
mod utils;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::Responder;
use crate::services::{ImageGenClient, TextGenClient};
use crate::status::{ServiceStatus, StatusMonitor, StatusProbe};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::load()?;
    let storage = storage::Storage::open(&config.data_dir)?;
    let models = Arc::new(RwLock::new(session::load_model_settings(&storage, &config)?));

    let http = reqwest::Client::new();
    let text_gen = Arc::new(TextGenClient::new(
        http.clone(),
        &config.text_gen_url,
        config.request_timeout,
    ));
    let image_gen = Arc::new(ImageGenClient::new(
        http,
        &config.image_gen_url,
        config.request_timeout,
    ));

    let status = Arc::new(RwLock::new(ServiceStatus::default()));
    let probe = Arc::new(StatusProbe::new(&config, text_gen.clone(), image_gen.clone()));
    let monitor = Arc::new(StatusMonitor::new(
        probe,
        status.clone(),
        models.clone(),
        config.poll_interval,
    ));

    let initial = monitor.refresh().await;
    match &initial.error {
        Some(error) => warn!("{}; missing features use demo data", error),
        None => info!("Both model services are up"),
    }
    let monitor_handle = monitor.clone().spawn();

    let session = session::DatingSession::new(
        &config,
        storage,
        Responder::new(text_gen, image_gen),
        status,
        models,
    );
    let console = console::Console::new(session, monitor);

    tokio::select! {
        result = console.run() => {
            if let Err(e) = result {
                tracing::error!("Console error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    monitor_handle.abort();
    info!("Shutdown complete");

    Ok(())
}
