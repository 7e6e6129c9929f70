//! Viewport targets and the timed animation between them

use crate::utils;
use geo::Coord;
use std::time::Duration;

/// Edge length of a map tile in screen pixels
const TILE_SIZE: f64 = 256.0;

/// A viewport: center in Web Mercator meters plus a slippy-map zoom level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTarget {
    pub center: Coord<f64>,
    pub zoom: f64,
}

impl ViewTarget {
    pub fn new(center: Coord<f64>, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Center given as longitude/latitude degrees
    pub fn from_lon_lat(lon: f64, lat: f64, zoom: f64) -> Self {
        Self::new(utils::lon_lat_to_mercator(lon, lat), zoom)
    }

    /// Center as `(lon, lat)` degrees
    pub fn center_lon_lat(&self) -> (f64, f64) {
        utils::mercator_to_lon_lat(self.center)
    }

    /// Same zoom, with the map content shifted by `(dx, dy)` screen pixels
    /// (positive `dy` moves content down)
    pub fn panned_by_pixels(&self, dx: f64, dy: f64) -> Self {
        let scale = meters_per_pixel(self.zoom);
        Self::new(
            Coord {
                x: self.center.x - dx * scale,
                y: self.center.y + dy * scale,
            },
            self.zoom,
        )
    }
}

/// Ground resolution of 256 px Web Mercator tiles at `zoom`
fn meters_per_pixel(zoom: f64) -> f64 {
    2.0 * utils::EARTH_MERCATOR_MAX / (TILE_SIZE * 2f64.powf(zoom))
}

/// Zoom levels and timing used when reframing the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfig {
    /// Zoom used for the "nothing to show" world view
    pub world_zoom: f64,
    /// Zoom used when centering on a route's first sample
    pub route_zoom: f64,
    pub animation: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            world_zoom: 2.0,
            route_zoom: 10.0,
            animation: Duration::from_millis(2000),
        }
    }
}

impl ViewConfig {
    /// World default: origin at the low world zoom
    pub fn world(&self) -> ViewTarget {
        ViewTarget::new(Coord { x: 0.0, y: 0.0 }, self.world_zoom)
    }
}

/// A request to animate the viewport to `target`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRequest {
    pub target: ViewTarget,
    pub duration: Duration,
}

/// In-flight interpolation between two viewports
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewAnimation {
    from: ViewTarget,
    to: ViewTarget,
    duration: Duration,
}

impl ViewAnimation {
    pub fn new(from: ViewTarget, request: ViewRequest) -> Self {
        Self {
            from,
            to: request.target,
            duration: request.duration,
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Viewport after `elapsed` time; clamps to the target once finished
    pub fn sample(&self, elapsed: Duration) -> ViewTarget {
        if self.duration.is_zero() || self.is_finished(elapsed) {
            return self.to;
        }
        let t = ease_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        ViewTarget {
            center: utils::lerp_coord(self.from.center, self.to.center, t),
            zoom: self.from.zoom + (self.to.zoom - self.from.zoom) * t,
        }
    }
}

/// Smooth start and stop, symmetric around the midpoint
fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t - (2.0 * std::f64::consts::PI * t).sin() / (2.0 * std::f64::consts::PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to: ViewTarget) -> ViewRequest {
        ViewRequest {
            target: to,
            duration: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_defaults_match_world_and_route_framing() {
        let config = ViewConfig::default();
        assert_eq!(config.world(), ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 2.0));
        assert_eq!(config.route_zoom, 10.0);
        assert_eq!(config.animation, Duration::from_secs(2));
    }

    #[test]
    fn test_animation_endpoints() {
        let from = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 2.0);
        let to = ViewTarget::from_lon_lat(10.0, 20.0, 10.0);
        let anim = ViewAnimation::new(from, request(to));
        assert_eq!(anim.sample(Duration::ZERO), from);
        assert_eq!(anim.sample(Duration::from_secs(2)), to);
        assert_eq!(anim.sample(Duration::from_secs(5)), to);
        assert!(!anim.is_finished(Duration::from_millis(1999)));
        assert!(anim.is_finished(Duration::from_secs(2)));
    }

    #[test]
    fn test_animation_midpoint_is_halfway() {
        let from = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 2.0);
        let to = ViewTarget::new(Coord { x: 1000.0, y: -1000.0 }, 10.0);
        let mid = ViewAnimation::new(from, request(to)).sample(Duration::from_secs(1));
        assert!((mid.zoom - 6.0).abs() < 1e-9);
        assert!((mid.center.x - 500.0).abs() < 1e-6);
        assert!((mid.center.y + 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_animation_is_monotonic() {
        let from = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 2.0);
        let to = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 10.0);
        let anim = ViewAnimation::new(from, request(to));
        let mut last = from.zoom;
        for ms in (0..=2000).step_by(100) {
            let z = anim.sample(Duration::from_millis(ms)).zoom;
            assert!(z >= last - 1e-9);
            last = z;
        }
    }

    #[test]
    fn test_center_lon_lat_roundtrips_degrees() {
        let (lon, lat) = ViewTarget::from_lon_lat(-3.7, 40.4, 10.0).center_lon_lat();
        assert!((lon + 3.7).abs() < 1e-9);
        assert!((lat - 40.4).abs() < 1e-9);
    }

    #[test]
    fn test_pan_by_pixels_moves_center_against_content() {
        let view = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 0.0);
        // At zoom 0 the whole world spans one tile
        let panned = view.panned_by_pixels(128.0, -64.0);
        assert!((panned.center.x + utils::EARTH_MERCATOR_MAX).abs() < 1e-6);
        assert!((panned.center.y + utils::EARTH_MERCATOR_MAX / 2.0).abs() < 1e-6);
        assert_eq!(panned.zoom, 0.0);

        let deeper = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 1.0).panned_by_pixels(128.0, 0.0);
        assert!((deeper.center.x + utils::EARTH_MERCATOR_MAX / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let from = ViewTarget::new(Coord { x: 0.0, y: 0.0 }, 2.0);
        let to = ViewTarget::new(Coord { x: 5.0, y: 5.0 }, 4.0);
        let anim = ViewAnimation::new(
            from,
            ViewRequest {
                target: to,
                duration: Duration::ZERO,
            },
        );
        assert_eq!(anim.sample(Duration::ZERO), to);
    }
}
