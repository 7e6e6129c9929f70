//! Projection helpers between geographic (EPSG:4326) and map (EPSG:3857) coordinates

use geo::Coord;

/// Half the width of the Web Mercator world square, in meters
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Project a longitude/latitude pair (degrees) to Web Mercator meters.
///
/// Latitudes beyond the Mercator limit are clamped so the poles stay finite.
#[inline]
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> Coord<f64> {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Coord {
        x: lon * LON_TO_X_FACTOR,
        y: (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR,
    }
}

/// Inverse of [`lon_lat_to_mercator`], returning `(lon, lat)` in degrees
#[inline]
pub fn mercator_to_lon_lat(coord: Coord<f64>) -> (f64, f64) {
    let lon = coord.x / LON_TO_X_FACTOR;
    let lat = (std::f64::consts::FRAC_PI_2 - 2.0 * (-coord.y / Y_FACTOR).exp().atan()).to_degrees();
    (lon, lat)
}

/// Linear interpolation between two projected coordinates
#[inline]
pub fn lerp_coord(from: Coord<f64>, to: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: from.x + (to.x - from.x) * t,
        y: from.y + (to.y - from.y) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_origin() {
        let c = lon_lat_to_mercator(0.0, 0.0);
        assert!(c.x.abs() < 0.01);
        assert!(c.y.abs() < 0.01);
    }

    #[test]
    fn test_antimeridian_hits_world_edge() {
        let west = lon_lat_to_mercator(-180.0, 0.0);
        let east = lon_lat_to_mercator(180.0, 0.0);
        assert!((west.x + EARTH_MERCATOR_MAX).abs() < 1.0);
        assert!((east.x - EARTH_MERCATOR_MAX).abs() < 1.0);
    }

    #[test]
    fn test_inverse_recovers_degrees() {
        let c = lon_lat_to_mercator(37.6173, 55.7558);
        let (lon, lat) = mercator_to_lon_lat(c);
        assert!((lon - 37.6173).abs() < 1e-6);
        assert!((lat - 55.7558).abs() < 1e-6);
    }

    #[test]
    fn test_poles_are_clamped() {
        let north = lon_lat_to_mercator(0.0, 90.0);
        assert!(north.y.is_finite());
        assert!((north.y - EARTH_MERCATOR_MAX).abs() < 1.0);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Coord { x: 0.0, y: 10.0 };
        let b = Coord { x: 100.0, y: -10.0 };
        assert_eq!(lerp_coord(a, b, 0.0), a);
        assert_eq!(lerp_coord(a, b, 1.0), b);
        assert_eq!(lerp_coord(a, b, 0.5), Coord { x: 50.0, y: 0.0 });
    }
}
