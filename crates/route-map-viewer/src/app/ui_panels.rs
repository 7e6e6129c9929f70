//! UI panels for the application
//!
//! Sidebar with the route selector and settings, plus the overlays drawn on
//! top of the map: zoom slider, marker popup, notifications and help.

use crate::app::state::{AppState, SidebarTab};
use crate::entrypoints::short_version_info;
use egui::{Color32, RichText, Ui};
use route_map_lib::{Control, PopupContent, Rgba, Route, TilesProvider};
use walkers::MapMemory;

/// Zoom range offered by the slider (OpenStreetMap tiles stop at 19)
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 19.0;

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    let selected = if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(260.0)
            .min_height(160.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state))
            .inner
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(280.0)
            .min_width(220.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state))
            .inner
    };

    if let Some(route) = selected {
        state.select_route(route, ctx);
    }
}

/// Shared between portrait and landscape; returns the route clicked this frame
fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) -> Option<Route> {
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Routes,
            "🗺 Routes",
        );
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Routes => render_routes_tab(ui, state),
            SidebarTab::Settings => {
                render_settings_tab(ui, state);
                None
            }
        })
        .inner
}

fn render_routes_tab(ui: &mut Ui, state: &AppState) -> Option<Route> {
    if state.routes.is_pending() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading routes...");
        });
        return None;
    }
    if let Some(error) = state.routes.error() {
        ui.label(RichText::new(format!("⚠ {error}")).color(ui.visuals().warn_fg_color));
    }
    if state.routes.routes().is_empty() {
        ui.label(RichText::new("No routes available").weak());
        return None;
    }

    let mut selected = None;
    route_selector(
        ui,
        state.routes.routes(),
        state.canvas.current_route(),
        |route| selected = Some(route.clone()),
    );
    selected
}

/// One radio entry per route, labelled with its name next to a swatch of its
/// color. Clicking any entry (the current one included) calls `on_select`.
pub fn route_selector(
    ui: &mut Ui,
    routes: &[Route],
    current: Option<&Route>,
    mut on_select: impl FnMut(&Route),
) {
    for route in routes {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 2.0, swatch_color(&route.color));

            let checked = current.is_some_and(|c| c.id == route.id);
            if ui.radio(checked, route.name.as_str()).clicked() {
                on_select(route);
            }
        });
    }
}

/// Swatch color of a route; falls back silently since this runs every frame
fn swatch_color(color: &str) -> Color32 {
    let [r, g, b, a] = Rgba::parse(color)
        .unwrap_or_else(|_| Rgba::default_route_color())
        .0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn render_settings_tab(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.set_tiles_provider(*provider);
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(short_version_info()).small());
    ui.label(
        RichText::new("Pick a route to see its recorded positions")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
}

/// Draw the canvas' on-map controls. Returns `true` if the user moved the zoom.
pub fn render_controls(
    ctx: &egui::Context,
    controls: &[Control],
    map_memory: &mut MapMemory,
) -> bool {
    let mut zoom_changed = false;
    for control in controls {
        match control {
            Control::ZoomSlider => zoom_changed |= zoom_slider(ctx, map_memory),
        }
    }
    zoom_changed
}

fn zoom_slider(ctx: &egui::Context, map_memory: &mut MapMemory) -> bool {
    egui::Area::new(egui::Id::new("zoom_slider"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .show(ui, |ui| {
                    let mut zoom = map_memory.zoom().clamp(MIN_ZOOM, MAX_ZOOM);
                    let mut changed = false;
                    ui.vertical_centered(|ui| {
                        if ui.small_button("+").clicked() {
                            zoom = (zoom + 1.0).min(MAX_ZOOM);
                            changed = true;
                        }
                        changed |= ui
                            .add(
                                egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM)
                                    .vertical()
                                    .show_value(false),
                            )
                            .changed();
                        if ui.small_button("-").clicked() {
                            zoom = (zoom - 1.0).max(MIN_ZOOM);
                            changed = true;
                        }
                    });
                    if changed && let Err(e) = map_memory.set_zoom(zoom) {
                        tracing::debug!("Failed to set zoom {zoom}: {e:?}");
                    }
                    changed
                })
                .inner
        })
        .inner
}

/// What the marker popup did this frame
pub struct MarkerPopup {
    /// The close button was clicked
    pub closed: bool,
    /// Screen area covered by the popup
    pub rect: egui::Rect,
}

/// Marker popup anchored above `screen_pos`
pub fn marker_popup(
    ctx: &egui::Context,
    screen_pos: egui::Pos2,
    content: &PopupContent,
) -> MarkerPopup {
    let mut close = false;
    let area = egui::Area::new(egui::Id::new("marker_popup"))
        .fixed_pos(screen_pos - egui::vec2(0.0, 8.0))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&content.time).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            close = true;
                        }
                    });
                });
                egui::Grid::new("marker_popup_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for (label, value) in [
                            ("Longitude:", &content.lon),
                            ("Latitude:", &content.lat),
                            ("Course:", &content.course),
                            ("Speed:", &content.speed),
                        ] {
                            ui.label(label);
                            ui.label(RichText::new(value).strong());
                            ui.end_row();
                        }
                    });
            });
        });
    MarkerPopup {
        closed: close,
        rect: area.response.rect,
    }
}

/// Gap kept between a popup and the edge of the screen
const POPUP_MARGIN: f32 = 8.0;

/// Shift that brings `popup` inside `screen`; zero when it already fits.
///
/// A popup larger than the screen keeps its top-left corner visible.
pub fn popup_overflow(popup: egui::Rect, screen: egui::Rect) -> egui::Vec2 {
    let inner = screen.shrink(POPUP_MARGIN);
    let axis = |min: f32, max: f32, lo: f32, hi: f32| {
        if min < lo {
            lo - min
        } else if max > hi {
            (hi - max).max(lo - min)
        } else {
            0.0
        }
    };
    egui::vec2(
        axis(popup.min.x, popup.max.x, inner.min.x, inner.max.x),
        axis(popup.min.y, popup.max.y, inner.min.y, inner.max.y),
    )
}

/// Notifications stacked in the bottom-right corner; a click dismisses one
pub fn render_toasts(ctx: &egui::Context, state: &mut AppState) {
    state.expire_toasts();
    if state.toasts.is_empty() {
        return;
    }

    let mut dismissed = None;
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -24.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for (index, toast) in state.toasts.iter().enumerate() {
                ui.scope(|ui| {
                    ui.set_opacity(toast.alpha());
                    let response = egui::Frame::popup(ui.style())
                        .fill(ui.visuals().extreme_bg_color)
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(toast.message.as_str());
                        })
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_cursor(egui::CursorIcon::PointingHand);
                    if response.clicked() {
                        dismissed = Some(index);
                    }
                });
            }
        });

    if let Some(index) = dismissed {
        state.dismiss_toast(index);
    }
    // Keep fading and expiring without input
    ctx.request_repaint_after(std::time::Duration::from_millis(100));
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Route Map Viewer");
            ui.add_space(8.0);

            ui.label("Shows the recorded positions of a route on the map.");
            ui.add_space(12.0);

            ui.label(RichText::new("Routes").strong());
            ui.label("• Pick a route in the sidebar to draw it");
            ui.label("• Click a position marker to see its time, course and speed");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll wheel or the slider to zoom");
            ui.label("• Click and drag to pan");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: i64, name: &str) -> Route {
        Route {
            id,
            name: name.to_string(),
            color: "red".to_string(),
        }
    }

    #[test]
    fn test_swatch_color_falls_back_to_blue() {
        assert_eq!(swatch_color("red"), Color32::from_rgb(255, 0, 0));
        assert_eq!(swatch_color("not-a-color"), Color32::from_rgb(0, 0, 255));
        assert_eq!(swatch_color(""), Color32::from_rgb(0, 0, 255));
    }

    fn screen() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    fn input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(screen()),
            events,
            ..Default::default()
        }
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    /// Draw one selector row per route; returns the row rects
    fn show_selector(
        ctx: &egui::Context,
        input: egui::RawInput,
        routes: &[Route],
        current: Option<&Route>,
        selected: &mut Vec<i64>,
    ) -> Vec<egui::Rect> {
        let mut rows = Vec::new();
        let _ = ctx.run(input, |ctx| {
            rows.clear();
            egui::CentralPanel::default().show(ctx, |ui| {
                for route in routes {
                    let row = ui.scope(|ui| {
                        route_selector(ui, std::slice::from_ref(route), current, |r| {
                            selected.push(r.id)
                        })
                    });
                    rows.push(row.response.rect);
                }
            });
        });
        rows
    }

    /// Press and release the primary button over the label of `row`
    fn click_row(
        ctx: &egui::Context,
        row: egui::Rect,
        routes: &[Route],
        current: Option<&Route>,
        selected: &mut Vec<i64>,
    ) {
        let pos = row.right_center() - egui::vec2(3.0, 0.0);
        show_selector(
            ctx,
            input(vec![egui::Event::PointerMoved(pos), button(pos, true)]),
            routes,
            current,
            selected,
        );
        show_selector(ctx, input(vec![button(pos, false)]), routes, current, selected);
    }

    #[test]
    fn test_route_selector_click_selects_including_current() {
        let ctx = egui::Context::default();
        let routes = vec![route(1, "Alpha"), route(2, "Beta")];
        let current = Some(&routes[0]);
        let mut selected = Vec::new();

        let rows = show_selector(&ctx, input(Vec::new()), &routes, current, &mut selected);
        assert_eq!(rows.len(), 2);
        assert!(selected.is_empty());

        click_row(&ctx, rows[0], &routes, current, &mut selected);
        assert_eq!(selected, vec![1]);

        click_row(&ctx, rows[1], &routes, current, &mut selected);
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn test_popup_overflow_inside_is_zero() {
        let popup = egui::Rect::from_min_size(egui::pos2(100.0, 100.0), egui::vec2(200.0, 120.0));
        assert_eq!(popup_overflow(popup, screen()), egui::Vec2::ZERO);
    }

    #[test]
    fn test_popup_overflow_pushes_back_on_screen() {
        // Clipped at the top-left
        let popup = egui::Rect::from_min_size(egui::pos2(-50.0, -20.0), egui::vec2(200.0, 120.0));
        assert_eq!(popup_overflow(popup, screen()), egui::vec2(58.0, 28.0));

        // Clipped at the bottom-right
        let popup = egui::Rect::from_min_size(egui::pos2(700.0, 550.0), egui::vec2(200.0, 120.0));
        assert_eq!(popup_overflow(popup, screen()), egui::vec2(-108.0, -78.0));

        // Taller than the screen: keep the top edge visible
        let popup = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(200.0, 900.0));
        assert_eq!(popup_overflow(popup, screen()), egui::vec2(0.0, -42.0));
    }

    #[test]
    fn test_route_selector_renders_without_selection() {
        let ctx = egui::Context::default();
        let routes = vec![route(1, "A"), route(2, "B")];
        let mut calls = 0;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                route_selector(ui, &routes, Some(&routes[0]), |_| calls += 1);
            });
        });
        assert_eq!(calls, 0);
    }
}
