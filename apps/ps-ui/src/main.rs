#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod fetch_worker;
mod format;
mod overlay_canvas;
mod views;

use std::path::PathBuf;

use app::PriceScopeApp;
use ps_core::DashboardConfig;

const ENV_CONFIG_PATH: &str = "PRICESCOPE_CONFIG";

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    let (config, config_error) = match DashboardConfig::resolve(config_path.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => {
            tracing::error!(error = %e, "falling back to default configuration");
            (DashboardConfig::default(), Some(e.to_string()))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("PriceScope"),
        ..Default::default()
    };

    eframe::run_native(
        "PriceScope",
        options,
        Box::new(move |cc| Ok(Box::new(PriceScopeApp::new(cc, config, config_error)))),
    )
}
