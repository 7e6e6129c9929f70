use crate::entrypoints::cli::parse_args;
use clap::Parser;
use route_map_lib::{DEFAULT_BASE_URL, TilesProvider};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Map Viewer - Pick a route and see its recorded positions on a map
pub struct Settings {
    /// Base URL of the route service (serves `GetRoutes` and `GetRouteData?id=`)
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Route line width in pixels
    #[clap(long, default_value = "3.0")]
    pub line_width: f32,

    /// Radius of the position markers in pixels
    #[clap(long, default_value = "3.0")]
    pub point_radius: f32,

    /// Zoom level used when a route is shown
    #[clap(long, default_value = "10")]
    pub route_zoom: f64,

    /// Zoom level of the whole-world view
    #[clap(long, default_value = "2")]
    pub world_zoom: f64,

    /// Duration of viewport animations in milliseconds
    #[clap(long, default_value = "2000")]
    pub animation_ms: u64,

    /// Base map tiles (osm or otm)
    #[clap(long, default_value = "osm")]
    pub tiles: TilesProvider,
}

impl Settings {
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from([env!("CARGO_PKG_NAME")])
                }
            }
        }
    }

    pub fn canvas_config(&self) -> route_map_lib::CanvasConfig {
        route_map_lib::CanvasConfig {
            base_tiles: self.tiles,
            line_width: self.line_width,
            point_radius: self.point_radius,
            view: route_map_lib::ViewConfig {
                world_zoom: self.world_zoom,
                route_zoom: self.route_zoom,
                animation: std::time::Duration::from_millis(self.animation_ms),
            },
        }
    }
}
