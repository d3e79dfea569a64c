use eframe::egui;

use proforma_dash::app::DashboardApp;
use proforma_dash::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard - Proformas 2026",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(settings)))),
    )
}
