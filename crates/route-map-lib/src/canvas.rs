//! Map canvas: selection, detail results, layer replacement and popup state
//!
//! The canvas never performs I/O itself. [`MapCanvas::select`] hands back a
//! [`DetailRequest`] that the caller executes; the response is fed back through
//! [`MapCanvas::apply_detail`] together with the request's generation. Only the
//! latest generation is ever applied, so a slow response for an earlier
//! selection can never overwrite the map after the user picked another route.

use crate::ApiError;
use crate::color::Rgba;
use crate::layer::{Feature, Layer, LayerSet, LayerStyle, TilesProvider, VectorLayer};
use crate::model::{Route, RouteData, RouteId};
use crate::popup::{Popup, PopupContent};
use crate::view::{ViewConfig, ViewRequest, ViewTarget};
use geo::Coord;

/// Notification text for a route without samples
pub const EMPTY_ROUTE_MESSAGE: &str = "Route is empty";

/// Static configuration of the canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
    pub base_tiles: TilesProvider,
    pub line_width: f32,
    pub point_radius: f32,
    pub view: ViewConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let style = LayerStyle::default();
        Self {
            base_tiles: TilesProvider::default(),
            line_width: style.line_width,
            point_radius: style.point_radius,
            view: ViewConfig::default(),
        }
    }
}

/// On-map controls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ZoomSlider,
}

/// A route detail fetch to perform on behalf of the canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetailRequest {
    pub generation: u64,
    pub route_id: RouteId,
}

/// What [`MapCanvas::apply_detail`] did with a result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The route layer now shows this many samples
    Route { samples: usize },
    /// Error or empty result: route layer cleared, view reset
    Cleared,
    /// Result belonged to a superseded selection and was dropped
    Stale,
}

/// Outcome of hit-testing a click against the route layer
#[derive(Clone, Debug, PartialEq)]
pub enum ClickHit {
    Point(RouteData),
    Line,
    Nothing,
}

impl From<Option<&Feature>> for ClickHit {
    fn from(feature: Option<&Feature>) -> Self {
        match feature {
            Some(Feature::Point(p)) => Self::Point(p.sample),
            Some(Feature::Line(_)) => Self::Line,
            None => Self::Nothing,
        }
    }
}

pub struct MapCanvas {
    config: CanvasConfig,
    layers: LayerSet,
    controls: Vec<Control>,
    popup: Popup,
    current_route: Option<Route>,
    generation: u64,
    view_request: Option<ViewRequest>,
    notices: Vec<String>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapCanvas {
    /// Base tiles at the bottom, an empty route layer above, a zoom control and
    /// a hidden popup.
    pub fn mount(config: CanvasConfig) -> Self {
        let mut layers = LayerSet::with_base(config.base_tiles);
        layers.add(Layer::Vector(VectorLayer::empty_route()));
        tracing::debug!("Map canvas mounted with {} layers", layers.len());
        Self {
            config,
            layers,
            controls: vec![Control::ZoomSlider],
            popup: Popup::default(),
            current_route: None,
            generation: 0,
            view_request: None,
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.current_route.as_ref()
    }

    /// Make `route` current and supersede any outstanding request.
    ///
    /// Selecting the route that is already current still issues a new request.
    pub fn select(&mut self, route: Route) -> DetailRequest {
        self.generation += 1;
        let request = DetailRequest {
            generation: self.generation,
            route_id: route.id,
        };
        tracing::info!(
            "Selected route {} ({:?}), request #{}",
            route.id,
            route.name,
            request.generation
        );
        self.current_route = Some(route);
        request
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_route.is_some() && generation == self.generation
    }

    /// Apply the result of the detail request issued with `generation`
    pub fn apply_detail(
        &mut self,
        generation: u64,
        result: Result<Vec<RouteData>, ApiError>,
    ) -> Applied {
        if !self.is_current(generation) {
            tracing::debug!(
                "Dropping stale route detail #{generation} (current #{})",
                self.generation
            );
            return Applied::Stale;
        }

        let samples = match result {
            Ok(samples) if !samples.is_empty() => samples,
            Ok(_) => {
                tracing::info!("Route detail #{generation} is empty");
                return self.clear(EMPTY_ROUTE_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::warn!("Route detail #{generation} failed: {e}");
                return self.clear(e.user_message());
            }
        };

        let color = self
            .current_route
            .as_ref()
            .map(|r| Rgba::parse_or_default(&r.color))
            .unwrap_or_else(Rgba::default_route_color);
        let style = LayerStyle {
            color,
            line_width: self.config.line_width,
            point_radius: self.config.point_radius,
        };
        let first = samples[0];
        self.layers
            .replace_route_layer(VectorLayer::route(&samples, style));
        self.popup.hide();
        self.view_request = Some(ViewRequest {
            target: ViewTarget::from_lon_lat(first.lon, first.lat, self.config.view.route_zoom),
            duration: self.config.view.animation,
        });

        Applied::Route {
            samples: samples.len(),
        }
    }

    fn clear(&mut self, message: String) -> Applied {
        self.notices.push(message);
        self.layers.replace_route_layer(VectorLayer::empty_route());
        self.popup.hide();
        self.view_request = Some(ViewRequest {
            target: self.config.view.world(),
            duration: self.config.view.animation,
        });
        Applied::Cleared
    }

    /// Hit-test a screen position against the route layer.
    ///
    /// `to_screen` maps Web Mercator to screen pixels.
    pub fn hit_test<F>(&self, click: Coord<f64>, to_screen: F, tolerance: f64) -> ClickHit
    where
        F: Fn(Coord<f64>) -> Coord<f64>,
    {
        self.layers
            .route_layer()
            .and_then(|layer| layer.hit_test(click, to_screen, tolerance))
            .into()
    }

    /// A map click at `coordinate` (Web Mercator): open the popup for a point
    /// marker, hide it for anything else.
    pub fn click(&mut self, hit: ClickHit, coordinate: Coord<f64>) {
        match hit {
            ClickHit::Point(sample) => {
                self.popup
                    .show(coordinate, PopupContent::from_sample(&sample));
            }
            ClickHit::Line | ClickHit::Nothing => self.popup.hide(),
        }
    }

    pub fn close_popup(&mut self) {
        self.popup.hide();
    }

    /// Swap the base tile layer without touching the route layer
    pub fn set_base_tiles(&mut self, provider: TilesProvider) {
        self.layers.replace_base_tiles(provider);
    }

    /// The viewport change requested by the last applied result, if not yet taken
    pub fn take_view_request(&mut self) -> Option<ViewRequest> {
        self.view_request.take()
    }

    /// Notifications raised since the last call
    pub fn drain_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}
