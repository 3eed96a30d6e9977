mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, Settings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::CollectPointApp;

#[derive(Parser, Debug)]
#[command(about = "Register a collect point")]
struct Args {
    /// Base URL of the collect point API.
    #[arg(long)]
    api_url: Option<String>,
    /// Base URL of the geo-division service.
    #[arg(long)]
    geo_url: Option<String>,
    /// Endpoint returning the device position as JSON.
    #[arg(long)]
    geolocation_url: Option<String>,
    #[arg(long)]
    zoom: Option<u8>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.api_url {
            settings.api_base_url = v;
        }
        if let Some(v) = self.geo_url {
            settings.geo_base_url = v;
        }
        if let Some(v) = self.geolocation_url {
            settings.geolocation_url = Some(v);
        }
        if let Some(v) = self.zoom {
            settings.map_zoom = v;
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut settings = load_settings();
    Args::parse().apply(&mut settings);
    tracing::info!(api = %settings.api_base_url, "starting collect point form");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ecoleta - Collect Point")
            .with_inner_size([960.0, 860.0])
            .with_min_inner_size([640.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Ecoleta - Collect Point",
        options,
        Box::new(move |_cc| Ok(Box::new(CollectPointApp::new(cmd_tx, ui_rx, &settings)))),
    )
}
