//! Route Map Library - Core of the route map viewer
//!
//! Everything here is independent of the UI toolkit so that the selection and
//! rendering rules can be exercised without a window.
//!
//! # Architecture
//!
//! - **[`RouteApi`]**: HTTP client for the route list and route detail endpoints
//! - **[`RouteListProvider`]**: the route list, fetched once
//! - **[`MapCanvas`]**: selection state, stale-result guard, route layer
//!   replacement, viewport requests and the marker popup
//! - **[`LayerSet`]**: ordered map layers with a single replaceable route layer

mod api;
mod canvas;
mod color;
mod layer;
mod model;
mod popup;
mod provider;
pub mod utils;
mod view;

// Public API exports
pub use api::{DEFAULT_BASE_URL, RouteApi, decode};
pub use canvas::{
    Applied, CanvasConfig, ClickHit, Control, DetailRequest, EMPTY_ROUTE_MESSAGE, MapCanvas,
};
pub use color::{DEFAULT_ROUTE_COLOR, Rgba};
pub use layer::{
    Feature, Layer, LayerSet, LayerStyle, LayerTag, LineFeature, PointFeature, TilesProvider,
    VectorLayer,
};
pub use model::{Route, RouteData, RouteId};
pub use popup::{Popup, PopupContent};
pub use provider::RouteListProvider;
pub use view::{ViewAnimation, ViewConfig, ViewRequest, ViewTarget};

/// Errors talking to the route service
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors parsing a route color
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Empty color")]
    Empty,

    #[error("Invalid color: {0:?}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _: fn(CanvasConfig) -> MapCanvas = MapCanvas::mount;
        let _: fn() -> RouteListProvider = RouteListProvider::new;
    }

    #[test]
    fn test_user_message() {
        let status = ApiError::Status {
            status: 404,
            message: "No such route".to_string(),
        };
        assert_eq!(status.user_message(), "No such route");
        assert_eq!(
            ApiError::InvalidUrl("x".to_string()).user_message(),
            "Invalid URL: x"
        );
    }
}
