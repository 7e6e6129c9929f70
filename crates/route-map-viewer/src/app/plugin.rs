//! Walkers plugin drawing the route layer and reporting clicks on it
//!
//! The plugin only sees a snapshot of the route layer. Anything that changes
//! state (the popup) is written to [`PluginOutput`] and applied by the app
//! after the map has been drawn.

use egui::{Color32, Pos2, Stroke};
use geo::Coord;
use route_map_lib::{ClickHit, Rgba, VectorLayer, utils};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Extra pixels around markers and lines that still count as a hit
const HIT_TOLERANCE: f64 = 4.0;

/// A click on the map, already hit-tested against the route layer
#[derive(Clone, Debug, PartialEq)]
pub struct MapClick {
    pub hit: ClickHit,
    /// Clicked position in Web Mercator
    pub coordinate: Coord<f64>,
}

/// Written by the plugin each frame
#[derive(Default)]
pub struct PluginOutput {
    pub click: Option<MapClick>,
    /// Screen position of the popup anchor, if a popup is open
    pub popup_screen: Option<Pos2>,
}

pub struct RouteLayerPlugin {
    layer: Arc<VectorLayer>,
    popup_anchor: Option<Coord<f64>>,
    output: Arc<Mutex<PluginOutput>>,
}

impl RouteLayerPlugin {
    pub fn new(
        layer: Arc<VectorLayer>,
        popup_anchor: Option<Coord<f64>>,
        output: Arc<Mutex<PluginOutput>>,
    ) -> Self {
        Self {
            layer,
            popup_anchor,
            output,
        }
    }
}

fn to_color32(color: Rgba) -> Color32 {
    let [r, g, b, a] = color.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Web Mercator to screen pixels
fn project(projector: &Projector, coord: Coord<f64>) -> Pos2 {
    let (lon, lat) = utils::mercator_to_lon_lat(coord);
    let screen = projector.project(walkers::lat_lon(lat, lon));
    Pos2::new(screen.x, screen.y)
}

/// Screen pixels to Web Mercator
fn unproject(projector: &Projector, pos: Pos2) -> Coord<f64> {
    let position = projector.unproject(pos.to_vec2());
    utils::lon_lat_to_mercator(position.x(), position.y())
}

impl Plugin for RouteLayerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RouteLayerPlugin::run");

        let painter = ui.painter();
        let style = self.layer.style;
        let color = to_color32(style.color);

        for line in self.layer.lines() {
            let screen_points: Vec<Pos2> = line
                .path
                .coords()
                .map(|c| project(projector, *c))
                .collect();
            if screen_points.len() >= 2 {
                painter.add(egui::Shape::line(
                    screen_points,
                    Stroke::new(style.line_width, color),
                ));
            }
        }
        for point in self.layer.points() {
            let center = project(projector, point.position);
            painter.circle(
                center,
                style.point_radius,
                color,
                Stroke::new(1.0, Color32::WHITE),
            );
        }

        let click = if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let to_screen = |c: Coord<f64>| {
                let p = project(projector, c);
                Coord {
                    x: p.x as f64,
                    y: p.y as f64,
                }
            };
            let hit = self.layer.hit_test(
                Coord {
                    x: pos.x as f64,
                    y: pos.y as f64,
                },
                to_screen,
                HIT_TOLERANCE,
            );
            Some(MapClick {
                hit: hit.into(),
                coordinate: unproject(projector, pos),
            })
        } else {
            None
        };

        match self.output.lock() {
            Ok(mut output) => {
                output.click = click;
                output.popup_screen = self.popup_anchor.map(|c| project(projector, c));
            }
            Err(e) => tracing::error!("Plugin output lock poisoned: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        assert_eq!(
            to_color32(Rgba::default_route_color()),
            Color32::from_rgb(0, 0, 255)
        );
        assert_eq!(
            to_color32(Rgba([255, 0, 0, 128])),
            Color32::from_rgba_unmultiplied(255, 0, 0, 128)
        );
    }
}
