mod app;
mod color;
mod dashboard;
mod data;
mod error;
mod settings;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::FinanceExplorerApp;
use data::cache::LoadCache;
use eframe::egui;
use settings::Settings;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let settings = Settings::load()?;
    let cache = LoadCache::new(settings.source.into_source());

    // The first load blocks and must succeed before the window opens.
    let state = AppState::new(cache, settings.window.chart_height)
        .inspect_err(|e| log::error!("Initial load failed: {e}"))
        .context("loading finance data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window.width, settings.window.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Finance Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(FinanceExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
