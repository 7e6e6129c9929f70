//! Wire-level data model shared by the route list and route detail endpoints

use serde::{Deserialize, Serialize};

/// Identifier of a route as assigned by the remote service
pub type RouteId = i64;

/// A named, colored route as returned by `GetRoutes`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    /// CSS color used for both the line stroke and the point fill
    #[serde(default)]
    pub color: String,
}

/// One timestamped position sample as returned by `GetRouteData`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    /// Milliseconds since the Unix epoch
    pub time: f64,
    pub lon: f64,
    pub lat: f64,
    /// Heading in degrees
    pub course: f64,
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_list_decodes() {
        let json = r##"[{"id":1,"name":"A","color":"red"},{"id":2,"name":"B","color":"#00ff00"}]"##;
        let routes: Vec<Route> = serde_json::from_str(json).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].id, 1);
        assert_eq!(routes[1].color, "#00ff00");
    }

    #[test]
    fn test_route_without_color_gets_empty_color() {
        let route: Route = serde_json::from_str(r#"{"id":7,"name":"Night bus"}"#).unwrap();
        assert!(route.color.is_empty());
    }

    #[test]
    fn test_samples_accept_integer_and_float_numbers() {
        let json = r#"[{"time":1700000000000,"lon":10,"lat":20.5,"course":5,"speed":1.25}]"#;
        let samples: Vec<RouteData> = serde_json::from_str(json).unwrap();
        assert_eq!(samples[0].time, 1_700_000_000_000.0);
        assert_eq!(samples[0].lon, 10.0);
        assert_eq!(samples[0].speed, 1.25);
    }
}
