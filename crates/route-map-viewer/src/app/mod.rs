//! Application module
//!
//! - Full-screen map with the selected route drawn on top of the base tiles
//! - Toggleable sidebar with tabs (Routes and Settings)
//! - Zoom slider, marker popup and notifications overlaid on the map
//! - Responsive layout (sidebar from bottom on portrait displays)

mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::{PluginOutput, RouteLayerPlugin};
use crate::app::settings::Settings;
use crate::app::state::AppState;
use eframe::egui;
use route_map_lib::{TilesProvider, ViewTarget};
use std::sync::{Arc, Mutex};
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Main application structure
pub struct RouteMapApp {
    /// Routes, map canvas and UI settings
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Show help overlay
    show_help: bool,

    /// Clicks and popup placement reported by the map plugin
    plugin_output: Arc<Mutex<PluginOutput>>,
}

impl RouteMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();
        let mut state = AppState::new(&settings);

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        let world = state.canvas.config().view.world();
        apply_view(&mut map_memory, world);

        state.start_route_list_fetch(&cc.egui_ctx);

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            show_help: false,
            plugin_output: Arc::new(Mutex::new(PluginOutput::default())),
        }
    }

    /// Viewport currently shown by the map
    fn current_view(&self) -> ViewTarget {
        let center = self
            .map_memory
            .detached()
            .unwrap_or_else(|| walkers::lat_lon(0.0, 0.0));
        ViewTarget::from_lon_lat(center.x(), center.y(), self.map_memory.zoom())
    }

    /// Apply the click and popup placement the plugin reported while drawing
    fn handle_plugin_output(&mut self, ctx: &egui::Context) {
        let (click, popup_screen) = match self.plugin_output.lock() {
            Ok(mut output) => (output.click.take(), output.popup_screen.take()),
            Err(e) => {
                tracing::error!("Plugin output lock poisoned: {e}");
                return;
            }
        };

        if let Some(click) = click {
            tracing::debug!("Map click: {:?}", click.hit);
            self.state.canvas.click(click.hit, click.coordinate);
            // The anchor moved; place the popup on the next frame
            ctx.request_repaint();
            return;
        }

        let shown = match (popup_screen, self.state.canvas.popup().visible()) {
            (Some(screen_pos), Some((_, content))) => {
                Some(ui_panels::marker_popup(ctx, screen_pos, content))
            }
            _ => None,
        };
        let Some(shown) = shown else {
            return;
        };
        if shown.closed {
            self.state.canvas.close_popup();
            return;
        }

        let offset = ui_panels::popup_overflow(shown.rect, ctx.content_rect());
        if offset != egui::Vec2::ZERO {
            let from = self.current_view();
            self.state.pan_view(from, offset);
            ctx.request_repaint();
        }
    }
}

fn apply_view(map_memory: &mut MapMemory, view: ViewTarget) {
    let (lon, lat) = view.center_lon_lat();
    map_memory.center_at(walkers::lat_lon(lat, lon));
    if let Err(e) = map_memory.set_zoom(view.zoom) {
        tracing::debug!("Failed to set zoom {}: {:?}", view.zoom, e);
    }
}

#[profiling::all_functions]
impl eframe::App for RouteMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });

        // Fetch results, then any viewport change they asked for
        self.state.process_events();
        let from = self.current_view();
        self.state.start_view_animation(from);
        if let Some(view) = self.state.step_view_animation() {
            apply_view(&mut self.map_memory, view);
            ctx.request_repaint();
        }

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        ui_panels::render_sidebar(ctx, &mut self.state);

        let route_layer = self.state.route_layer.clone();
        let popup_anchor = self.state.canvas.popup().visible().map(|(anchor, _)| anchor);
        let tiles_provider = self.state.canvas.layers().base_tiles().unwrap_or_default();
        let plugin_output = self.plugin_output.clone();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(RouteLayerPlugin::new(
                    route_layer,
                    popup_anchor,
                    plugin_output,
                ));

                let response = ui.add(map);
                if response.dragged() {
                    self.state.cancel_view_animation();
                }

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    tiles_provider.attribution(),
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        if ui_panels::render_controls(ctx, self.state.canvas.controls(), &mut self.map_memory) {
            self.state.cancel_view_animation();
        }

        self.handle_plugin_output(ctx);
        ui_panels::render_toasts(ctx, &mut self.state);
    }
}
