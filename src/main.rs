//! Cosmetics Dashboard - Brand, ingredient and price/rating charts for a cosmetics CSV
//!
//! A Rust application that loads a product CSV and shows three linked, interactive charts.

mod charts;
mod config;
mod data;
mod gui;

use anyhow::Context;
use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;

fn main() -> anyhow::Result<()> {
    let config_path = DashboardConfig::default_path();
    let config = DashboardConfig::load_or_default(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    let level = config.max_level()?;
    tracing_subscriber::fmt().with_max_level(level).init();
    tracing::info!("Starting Cosmetics Dashboard");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Cosmetics Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Cosmetics Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
