//! Route Map Viewer - Application Library
//!
//! Integrates the route map core with egui/walkers and the platform entry points.

mod app;
mod entrypoints;

pub use app::RouteMapApp;

#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;

/// Run the application on native (desktop) platforms.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Failed to create Tokio runtime: {err}");
            std::process::exit(1);
        }
    };

    rt.block_on(entrypoints::native_main());
}
