//! Application state management
//!
//! This module owns the route list, the map canvas and the UI settings, runs
//! the network fetches in the background and feeds their results back into
//! the canvas on the UI thread.

use crate::app::settings::Settings;
use crate::entrypoints::runtime;
use route_map_lib::{
    ApiError, Applied, MapCanvas, Route, RouteApi, RouteData, RouteListProvider, TilesProvider,
    VectorLayer, ViewAnimation, ViewRequest, ViewTarget,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long a notification stays on screen
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Duration of the nudge that brings a clipped popup back on screen
pub const POPUP_PAN: Duration = Duration::from_millis(250);

/// Main application state
pub struct AppState {
    /// Route service client; `None` when the configured base URL is unusable
    api: Option<RouteApi>,

    /// Routes offered by the selector
    pub routes: RouteListProvider,

    /// Selection, route layer, popup and pending viewport changes
    pub canvas: MapCanvas,

    /// Snapshot of the route layer shared with the map plugin
    pub route_layer: Arc<VectorLayer>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Notifications on screen, oldest first
    pub toasts: Vec<Toast>,

    /// Viewport animation in progress
    animation: Option<(ViewAnimation, instant::Instant)>,

    events_tx: mpsc::UnboundedSender<FetchEvent>,
    events_rx: mpsc::UnboundedReceiver<FetchEvent>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Routes,
    Settings,
}

/// A transient notification
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub shown_at: instant::Instant,
}

impl Toast {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_TTL
    }

    /// Remaining visibility from 1.0 down to 0.0, fading over the last second
    pub fn alpha(&self) -> f32 {
        let left = TOAST_TTL.saturating_sub(self.shown_at.elapsed()).as_secs_f32();
        left.clamp(0.0, 1.0)
    }
}

/// Completed background fetches, delivered to the UI thread
pub enum FetchEvent {
    Routes(Result<Vec<Route>, ApiError>),
    Detail {
        generation: u64,
        result: Result<Vec<RouteData>, ApiError>,
    },
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let canvas = MapCanvas::mount(settings.canvas_config());
        let route_layer = Arc::new(
            canvas
                .layers()
                .route_layer()
                .cloned()
                .unwrap_or_else(VectorLayer::empty_route),
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut state = Self {
            api: None,
            routes: RouteListProvider::new(),
            canvas,
            route_layer,
            ui_settings: UiSettings {
                tiles_provider: settings.tiles,
                sidebar_open: true,
                active_tab: SidebarTab::Routes,
            },
            toasts: Vec::new(),
            animation: None,
            events_tx,
            events_rx,
        };

        match RouteApi::new(&settings.base_url) {
            Ok(api) => {
                tracing::info!("Using route service at {}", api.base_url());
                state.api = Some(api);
            }
            Err(e) => {
                tracing::error!("Cannot use route service: {e}");
                state.push_toast(e.user_message());
            }
        }
        state
    }

    /// Issue the single route list fetch (no-op if it was already issued)
    pub fn start_route_list_fetch(&mut self, ctx: &egui::Context) {
        let Some(api) = self.api.clone() else {
            return;
        };
        if !self.routes.begin_fetch() {
            return;
        }

        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        runtime::spawn(async move {
            let result = api.routes().await;
            let _ = tx.send(FetchEvent::Routes(result));
            ctx.request_repaint();
        });
    }

    /// Select a route and fetch its detail; any earlier fetch becomes stale
    pub fn select_route(&mut self, route: Route, ctx: &egui::Context) {
        let request = self.canvas.select(route);
        let Some(api) = self.api.clone() else {
            return;
        };

        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        runtime::spawn(async move {
            let result = api.route_data(request.route_id).await;
            let _ = tx.send(FetchEvent::Detail {
                generation: request.generation,
                result,
            });
            ctx.request_repaint();
        });
    }

    /// Apply every fetch result received since the last frame.
    ///
    /// Returns `true` if anything changed.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            changed = true;
            match event {
                FetchEvent::Routes(result) => self.routes.finish_fetch(result),
                FetchEvent::Detail { generation, result } => {
                    let applied = self.canvas.apply_detail(generation, result);
                    tracing::debug!("Route detail #{generation}: {applied:?}");
                    if applied != Applied::Stale {
                        self.refresh_route_layer();
                    }
                }
            }
        }
        for notice in self.canvas.drain_notices() {
            self.push_toast(notice);
        }
        changed
    }

    fn refresh_route_layer(&mut self) {
        if let Some(layer) = self.canvas.layers().route_layer() {
            self.route_layer = Arc::new(layer.clone());
        }
    }

    pub fn push_toast(&mut self, message: String) {
        self.toasts.push(Toast {
            message,
            shown_at: instant::Instant::now(),
        });
    }

    pub fn dismiss_toast(&mut self, index: usize) {
        if index < self.toasts.len() {
            self.toasts.remove(index);
        }
    }

    pub fn expire_toasts(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    /// Switch the base tiles; the route layer is left alone
    pub fn set_tiles_provider(&mut self, provider: TilesProvider) {
        if self.ui_settings.tiles_provider == provider {
            return;
        }
        tracing::info!("Switching base tiles to {}", provider.name());
        self.ui_settings.tiles_provider = provider;
        self.canvas.set_base_tiles(provider);
    }

    /// Start animating from the current viewport toward the canvas' pending request
    pub fn start_view_animation(&mut self, from: ViewTarget) {
        if let Some(request) = self.canvas.take_view_request() {
            self.animate_to(from, request);
        }
    }

    fn animate_to(&mut self, from: ViewTarget, request: ViewRequest) {
        self.animation = Some((ViewAnimation::new(from, request), instant::Instant::now()));
    }

    /// Slide the map by `offset` screen pixels unless another animation runs
    pub fn pan_view(&mut self, from: ViewTarget, offset: egui::Vec2) {
        if self.animation.is_some() || offset == egui::Vec2::ZERO {
            return;
        }
        let target = from.panned_by_pixels(offset.x as f64, offset.y as f64);
        self.animate_to(
            from,
            ViewRequest {
                target,
                duration: POPUP_PAN,
            },
        );
    }

    /// Viewport for this frame while an animation runs
    pub fn step_view_animation(&mut self) -> Option<ViewTarget> {
        let (animation, started) = self.animation?;
        let elapsed = started.elapsed();
        if animation.is_finished(elapsed) {
            self.animation = None;
        }
        Some(animation.sample(elapsed))
    }

    pub fn cancel_view_animation(&mut self) {
        self.animation = None;
    }

    #[cfg(test)]
    fn events_sender(&self) -> mpsc::UnboundedSender<FetchEvent> {
        self.events_tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use route_map_lib::EMPTY_ROUTE_MESSAGE;

    fn state() -> AppState {
        AppState::new(&Settings::parse_from(["route-map-viewer"]))
    }

    fn route(id: i64, color: &str) -> Route {
        Route {
            id,
            name: format!("Route {id}"),
            color: color.to_string(),
        }
    }

    fn sample(lon: f64, lat: f64) -> RouteData {
        RouteData {
            time: 0.0,
            lon,
            lat,
            course: 5.0,
            speed: 1.0,
        }
    }

    #[test]
    fn test_new_state() {
        let state = state();
        assert!(state.api.is_some());
        assert!(state.route_layer.features.is_empty());
        assert!(state.toasts.is_empty());
        assert_eq!(state.ui_settings.active_tab, SidebarTab::Routes);
    }

    #[test]
    fn test_invalid_base_url_notifies() {
        let settings = Settings::parse_from(["route-map-viewer", "--base-url", "not a url"]);
        let state = AppState::new(&settings);
        assert!(state.api.is_none());
        assert_eq!(state.toasts.len(), 1);
    }

    #[test]
    fn test_route_list_event() {
        let mut state = state();
        let tx = state.events_sender();
        tx.send(FetchEvent::Routes(Ok(vec![route(1, "red")])))
            .unwrap();
        assert!(state.process_events());
        assert_eq!(state.routes.routes().len(), 1);
        assert!(!state.process_events());
    }

    #[test]
    fn test_stale_detail_is_ignored() {
        let mut state = state();
        let first = state.canvas.select(route(1, "red"));
        let second = state.canvas.select(route(2, "green"));
        let tx = state.events_sender();
        tx.send(FetchEvent::Detail {
            generation: second.generation,
            result: Ok(vec![sample(1.0, 2.0), sample(3.0, 4.0)]),
        })
        .unwrap();
        tx.send(FetchEvent::Detail {
            generation: first.generation,
            result: Ok(vec![sample(10.0, 20.0)]),
        })
        .unwrap();
        state.process_events();

        assert_eq!(state.route_layer.points().count(), 2);
        assert_eq!(state.route_layer.lines().count(), 1);
    }

    #[test]
    fn test_empty_detail_becomes_toast() {
        let mut state = state();
        let request = state.canvas.select(route(1, "red"));
        state
            .events_sender()
            .send(FetchEvent::Detail {
                generation: request.generation,
                result: Ok(Vec::new()),
            })
            .unwrap();
        state.process_events();

        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.toasts[0].message, EMPTY_ROUTE_MESSAGE);
        assert!(state.route_layer.features.is_empty());

        state.dismiss_toast(0);
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn test_view_animation_runs_to_target() {
        let mut state = state();
        let request = state.canvas.select(route(1, "red"));
        state
            .canvas
            .apply_detail(request.generation, Ok(vec![sample(10.0, 20.0)]));

        state.start_view_animation(ViewTarget::from_lon_lat(0.0, 0.0, 2.0));
        assert!(state.step_view_animation().is_some());
        assert!(state.step_view_animation().is_some());

        state.cancel_view_animation();
        assert!(state.step_view_animation().is_none());
    }

    #[test]
    fn test_popup_pan_yields_to_running_animation() {
        let mut state = state();
        let from = ViewTarget::from_lon_lat(0.0, 0.0, 10.0);

        state.pan_view(from, egui::Vec2::ZERO);
        assert!(state.step_view_animation().is_none());

        state.pan_view(from, egui::vec2(20.0, 0.0));
        let Some((animation, _)) = state.animation else {
            panic!("pan did not start");
        };
        let end = animation.sample(POPUP_PAN);
        assert!(end.center.x < from.center.x);
        assert_eq!(end.zoom, from.zoom);

        // A second overflow report while sliding does not restart the pan
        state.pan_view(from, egui::vec2(-500.0, 0.0));
        let Some((again, _)) = state.animation else {
            panic!("pan was dropped");
        };
        assert_eq!(again.sample(POPUP_PAN), end);
    }

    #[test]
    fn test_tiles_switch_keeps_route_layer() {
        let mut state = state();
        let request = state.canvas.select(route(1, "red"));
        state
            .canvas
            .apply_detail(request.generation, Ok(vec![sample(10.0, 20.0)]));
        state.refresh_route_layer();

        state.set_tiles_provider(TilesProvider::OpenTopoMap);
        assert_eq!(
            state.canvas.layers().base_tiles(),
            Some(TilesProvider::OpenTopoMap)
        );
        assert_eq!(state.route_layer.points().count(), 1);
    }

    #[test]
    fn test_fresh_toast_is_visible() {
        let mut state = state();
        state.push_toast("hello".to_string());
        state.expire_toasts();
        assert_eq!(state.toasts.len(), 1);
        assert!(state.toasts[0].alpha() > 0.0);
    }
}
