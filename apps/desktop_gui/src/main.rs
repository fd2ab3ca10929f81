use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{load_settings, ClassifierBackend, HttpClassifierClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::ClassifierApp;

#[derive(Debug, Parser)]
#[command(about = "Desktop form for contract document classification")]
struct Args {
    /// Base URL of the classification service
    #[arg(long)]
    server_url: Option<String>,
    /// Per-request timeout; 0 disables it
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = load_settings()
        .context("failed to load classifier settings")?
        .with_cli_overrides(args.server_url, args.request_timeout_secs)?;
    tracing::info!(server_url = %settings.server_url, "starting classifier desktop");

    let backend: Arc<dyn ClassifierBackend> =
        Arc::new(HttpClassifierClient::new(&settings).context("failed to build http client")?);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(backend, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Artifact Classifier")
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([480.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Artifact Classifier",
        options,
        Box::new(move |_cc| Ok(Box::new(ClassifierApp::new(&settings, cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop ui exited with error: {err}"))
}
