mod app;

use std::path::PathBuf;

use eframe::NativeOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use valora_pricing::{config::AppConfig, storage::FileStorage};

use crate::app::ValoraApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load();
    let storage = match &config.data_dir {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::platform_default().unwrap_or_else(|| {
            warn!("no platform data directory, storing records next to the binary");
            FileStorage::new(PathBuf::from("valora-data"))
        }),
    };
    info!(dir = %storage.dir().display(), "using local storage");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ValoraPricing")
            .with_inner_size([1040.0, 820.0])
            .with_min_inner_size([720.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ValoraPricing",
        options,
        Box::new(move |cc| Ok(Box::new(ValoraApp::new(cc, config, storage)))),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}
