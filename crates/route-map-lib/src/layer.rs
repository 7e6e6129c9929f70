//! Map layers and the reconciliation of the single "route" layer
//!
//! The layer set is ordered bottom to top. The base tile layer always sits at
//! the bottom; exactly one vector layer is tagged [`LayerTag::Route`] and is
//! swapped in place whenever a new route (or the lack of one) must be shown.

use crate::color::Rgba;
use crate::model::RouteData;
use crate::utils;
use geo::{Closest, ClosestPoint, Coord, LineString, Point};
use std::str::FromStr;

/// Available base map tile providers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TilesProvider {
    #[default]
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

impl FromStr for TilesProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "openstreetmap" | "osm" => Ok(Self::OpenStreetMap),
            "opentopomap" | "otm" => Ok(Self::OpenTopoMap),
            other => Err(format!("unknown tiles provider: {other}")),
        }
    }
}

/// Tag identifying a layer that gets replaced rather than stacked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerTag {
    Route,
}

/// Stroke and fill settings shared by every feature of a vector layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    pub color: Rgba,
    pub line_width: f32,
    pub point_radius: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: Rgba::default_route_color(),
            line_width: 3.0,
            point_radius: 3.0,
        }
    }
}

/// A position marker carrying the sample it was built from
#[derive(Clone, Debug, PartialEq)]
pub struct PointFeature {
    /// Web Mercator position
    pub position: Coord<f64>,
    pub sample: RouteData,
}

/// The path through all samples of a route, in Web Mercator
#[derive(Clone, Debug, PartialEq)]
pub struct LineFeature {
    pub path: LineString<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    Point(PointFeature),
    Line(LineFeature),
}

/// A layer of vector features drawn with one style
#[derive(Clone, Debug, PartialEq)]
pub struct VectorLayer {
    pub tag: Option<LayerTag>,
    pub features: Vec<Feature>,
    pub style: LayerStyle,
}

impl VectorLayer {
    /// An empty route layer, used on mount and whenever a fetch fails or is empty
    pub fn empty_route() -> Self {
        Self {
            tag: Some(LayerTag::Route),
            features: Vec::new(),
            style: LayerStyle::default(),
        }
    }

    /// Build the route layer: one point per sample, then one line through all
    /// samples in their original order. Coordinates are reprojected to Web Mercator.
    pub fn route(samples: &[RouteData], style: LayerStyle) -> Self {
        profiling::scope!("VectorLayer::route");

        let mut features = Vec::with_capacity(samples.len() + 1);
        let mut path = Vec::with_capacity(samples.len());
        for sample in samples {
            let position = utils::lon_lat_to_mercator(sample.lon, sample.lat);
            path.push(position);
            features.push(Feature::Point(PointFeature {
                position,
                sample: *sample,
            }));
        }
        features.push(Feature::Line(LineFeature {
            path: LineString::new(path),
        }));

        Self {
            tag: Some(LayerTag::Route),
            features,
            style,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &PointFeature> {
        self.features.iter().filter_map(|f| match f {
            Feature::Point(p) => Some(p),
            Feature::Line(_) => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineFeature> {
        self.features.iter().filter_map(|f| match f {
            Feature::Line(l) => Some(l),
            Feature::Point(_) => None,
        })
    }

    /// Find the feature under a screen position.
    ///
    /// `to_screen` maps Web Mercator to screen pixels. Point markers win over
    /// lines; among points the closest one within reach is returned.
    pub fn hit_test<F>(&self, click: Coord<f64>, to_screen: F, tolerance: f64) -> Option<&Feature>
    where
        F: Fn(Coord<f64>) -> Coord<f64>,
    {
        let point_reach = self.style.point_radius as f64 + tolerance;
        let closest_point = self
            .features
            .iter()
            .filter_map(|f| match f {
                Feature::Point(p) => {
                    let s = to_screen(p.position);
                    Some((f, (s.x - click.x).hypot(s.y - click.y)))
                }
                Feature::Line(_) => None,
            })
            .filter(|(_, d)| *d <= point_reach)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((feature, _)) = closest_point {
            return Some(feature);
        }

        let line_reach = self.style.line_width as f64 / 2.0 + tolerance;
        let click_point = Point::from(click);
        self.features.iter().find(|f| match f {
            Feature::Line(line) => {
                let screen: LineString<f64> = line.path.coords().map(|c| to_screen(*c)).collect();
                let nearest = match screen.closest_point(&click_point) {
                    Closest::Intersection(p) | Closest::SinglePoint(p) => Some(p),
                    Closest::Indeterminate => screen.0.first().map(|c| Point::from(*c)),
                };
                nearest
                    .map(|p| (p.x() - click.x).hypot(p.y() - click.y) <= line_reach)
                    .unwrap_or(false)
            }
            Feature::Point(_) => false,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    Tiles(TilesProvider),
    Vector(VectorLayer),
}

/// Ordered set of map layers, bottom first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerSet {
    layers: Vec<Layer>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LayerSet {
    /// A layer set holding only a base tile layer
    pub fn with_base(provider: TilesProvider) -> Self {
        Self {
            layers: vec![Layer::Tiles(provider)],
        }
    }

    pub fn add(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn route_index(&self) -> Option<usize> {
        self.layers.iter().position(|l| {
            matches!(l, Layer::Vector(VectorLayer { tag: Some(LayerTag::Route), .. }))
        })
    }

    pub fn route_layer(&self) -> Option<&VectorLayer> {
        self.route_index().and_then(|i| match &self.layers[i] {
            Layer::Vector(v) => Some(v),
            Layer::Tiles(_) => None,
        })
    }

    pub fn route_layer_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, Layer::Vector(VectorLayer { tag: Some(LayerTag::Route), .. })))
            .count()
    }

    /// Swap the route layer in place, leaving every other layer untouched.
    ///
    /// If no route layer exists yet, the new one goes on top.
    pub fn replace_route_layer(&mut self, mut layer: VectorLayer) {
        layer.tag = Some(LayerTag::Route);
        match self.route_index() {
            Some(i) => self.layers[i] = Layer::Vector(layer),
            None => self.layers.push(Layer::Vector(layer)),
        }
    }

    pub fn base_tiles(&self) -> Option<TilesProvider> {
        self.layers.iter().find_map(|l| match l {
            Layer::Tiles(p) => Some(*p),
            Layer::Vector(_) => None,
        })
    }

    /// Swap the base tile layer in place, leaving the route layer untouched
    pub fn replace_base_tiles(&mut self, provider: TilesProvider) {
        match self.layers.iter().position(|l| matches!(l, Layer::Tiles(_))) {
            Some(i) => self.layers[i] = Layer::Tiles(provider),
            None => self.layers.insert(0, Layer::Tiles(provider)),
        }
    }
}
