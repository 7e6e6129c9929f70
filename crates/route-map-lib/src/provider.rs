//! Route list state, fetched once on mount

use crate::ApiError;
use crate::model::Route;

#[derive(Clone, Debug, Default, PartialEq)]
enum ListState {
    #[default]
    Unset,
    Pending,
    Loaded(Vec<Route>),
    Failed(String),
}

/// Holds the available routes; reads as an empty list until a fetch succeeds
#[derive(Clone, Debug, Default)]
pub struct RouteListProvider {
    state: ListState,
}

impl RouteListProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the single mount fetch as issued. Returns `false` if it already was,
    /// so callers never fetch the list twice.
    pub fn begin_fetch(&mut self) -> bool {
        if self.state != ListState::Unset {
            return false;
        }
        self.state = ListState::Pending;
        true
    }

    /// Store the fetch outcome, replacing any previous list wholesale
    pub fn finish_fetch(&mut self, result: Result<Vec<Route>, ApiError>) {
        self.state = match result {
            Ok(routes) => {
                tracing::info!("Loaded {} routes", routes.len());
                ListState::Loaded(routes)
            }
            Err(e) => {
                tracing::warn!("Failed to load route list: {e}");
                ListState::Failed(e.user_message())
            }
        };
    }

    pub fn routes(&self) -> &[Route] {
        match &self.state {
            ListState::Loaded(routes) => routes,
            _ => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == ListState::Pending
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
