//! Courier API Client - Main Entry Point
//!
//! Initializes logging and configuration, wires the adapters into a
//! workbench and runs one command.

mod cli;
mod commands;
mod dialog;

use std::sync::Arc;

use clap::Parser;
use courier_application::{AppContext, Backends, Workbench, shared_history};
use courier_infrastructure::{
    AppConfig, DirectTransport, FileKeyValueStore, RestBackend, SelectedTransport,
    TracingNotifier, TransportMode,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::dialog::TerminalDialog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::debug!(
        api_base = config.api_base_str(),
        data_dir = %config.data_dir.display(),
        transport = %config.transport,
        "configuration loaded"
    );

    let store = Arc::new(FileKeyValueStore::open(&config.data_dir).await?);
    let context = AppContext::new(
        store.clone(),
        Arc::new(TerminalDialog::new(cli.yes)),
        Arc::new(TracingNotifier),
    );

    let backend = Arc::new(RestBackend::new(
        config.api_base_str(),
        context.auth.clone(),
        config.timeout,
    )?);
    let transport = match config.transport {
        TransportMode::Proxy => SelectedTransport::Proxy(backend.clone()),
        TransportMode::Direct => SelectedTransport::Direct(DirectTransport::new(config.timeout)?),
    };

    let mut workbench = Workbench::new(
        context,
        Backends {
            collections: backend.clone(),
            environments: backend,
            transport: Arc::new(transport),
        },
        shared_history(),
    );

    let outcome = commands::run(&mut workbench, cli.command).await;
    // Local state changes must reach disk before the runtime shuts down.
    store.sync().await?;
    outcome?;

    Ok(())
}
