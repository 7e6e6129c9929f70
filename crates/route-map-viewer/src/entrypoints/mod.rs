//! Platform entry points for the viewer
//!
//! - Native: [`native_main`] runs inside the tokio runtime built by `run_native()`
//! - Web: [`web::WebHandle`] is driven from JavaScript

pub mod cli;
pub mod logging;
pub mod metadata;
pub mod runtime;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use metadata::{log_version_info, short_version_info};

/// Window title and eframe app id
#[cfg(not(target_arch = "wasm32"))]
pub const APP_NAME: &str = "Route Map Viewer";

#[cfg(not(target_arch = "wasm32"))]
pub async fn native_main() {
    logging::setup_logging();
    log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    if let Err(err) = eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(crate::RouteMapApp::new(cc)))),
    ) {
        tracing::error!("Failed to run the application: {}", err);
    }
}
