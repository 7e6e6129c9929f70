//! HTTP client for the route service
//!
//! Two endpoints, both relative to a configurable base URL:
//! - `GetRoutes` returns the list of routes
//! - `GetRouteData?id=N` returns the ordered samples of one route

use crate::model::{Route, RouteData, RouteId};
use crate::{ApiError, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://janti.ru:5381/Main/";

/// Client for the route service. Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct RouteApi {
    client: reqwest::Client,
    base_url: Url,
}

impl RouteApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn routes_url(&self) -> Result<Url> {
        self.base_url
            .join("GetRoutes")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    pub fn route_data_url(&self, id: RouteId) -> Result<Url> {
        let mut url = self
            .base_url
            .join("GetRouteData")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("id", &id.to_string());
        Ok(url)
    }

    /// `GET {base}/GetRoutes`
    pub async fn routes(&self) -> Result<Vec<Route>> {
        let url = self.routes_url()?;
        self.get_json(url).await
    }

    /// `GET {base}/GetRouteData?id={id}`; an unknown route yields an empty list
    pub async fn route_data(&self, id: RouteId) -> Result<Vec<RouteData>> {
        let url = self.route_data_url(id)?;
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status_message(&body, status.canonical_reason(), status.as_u16()),
            });
        }
        let bytes = response.bytes().await?;
        decode(&bytes)
    }
}

/// Ensure the base URL ends in `/` so endpoint names are joined as children
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{trimmed}: {e}")))
}

/// Decode a JSON response body
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Message shown for a failed request: the server's body text when present,
/// otherwise the status line.
fn status_message(body: &str, reason: Option<&str>, status: u16) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    match reason {
        Some(reason) => format!("{status} {reason}"),
        None => format!("HTTP {status}"),
    }
}
