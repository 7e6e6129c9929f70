use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

/// Filter used when `RUST_LOG` is not set
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER: &str = "info,eframe=warn,walkers=info";

/// Initialize the global tracing subscriber (fmt layer filtered by `RUST_LOG`).
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    if report_init(registry.try_init()) {
        tracing::info!("Logging initialized");
    }
}

/// Initialize logging to the browser console plus the panic hook.
///
/// The level comes from `?envLOG_LEVEL=debug`, defaulting to DEBUG in debug builds.
#[cfg(target_arch = "wasm32")]
pub fn setup_logging() {
    use tracing_wasm::WASMLayerConfigBuilder;

    let default_level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let max_level = super::cli::get_env::<String>("LOG_LEVEL")
        .map(|level| parse_level(&level, default_level))
        .unwrap_or(default_level);

    let mut builder = WASMLayerConfigBuilder::new();
    builder.set_max_level(max_level);
    let registry =
        tracing_subscriber::registry().with(tracing_wasm::WASMLayer::new(builder.build()));
    if report_init(registry.try_init()) {
        tracing::info!("Logging initialized");
    }

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

/// Returns `true` if the subscriber was installed; a second install only warns
fn report_init(result: Result<(), TryInitError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("A global subscriber was already installed: {e}");
            false
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn parse_level(level: &str, fallback: tracing::Level) -> tracing::Level {
    match level.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => fallback,
    }
}
