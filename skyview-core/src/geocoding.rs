//! Forward (city name -> places) and reverse (lat/lon -> place) geocoding.
//!
//! The `lookup_*` methods return a `Result`, so callers that care can tell
//! "nothing matched" from "the provider is down". The interactive façade
//! (`search_locations`, `resolve_single`, `resolve_from_coordinates`) collapses
//! both into an empty answer and logs the failure.

use reqwest::Client;
use serde::Deserialize;

use crate::{Config, error::GeocodingError, model::Coordinates, provider::ServiceId};

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

const LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Client,
    search_url: String,
    reverse_url: String,
    default_limit: usize,
}

impl Geocoder {
    pub fn new(http: Client, search_url: impl Into<String>, reverse_url: impl Into<String>) -> Self {
        Self {
            http,
            search_url: search_url.into(),
            reverse_url: reverse_url.into(),
            default_limit: crate::config::DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Self {
        Self {
            default_limit: config.search_limit(),
            ..Self::new(
                http,
                config.endpoint_url(ServiceId::Geocoding),
                config.endpoint_url(ServiceId::ReverseGeocoding),
            )
        }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Candidates for a free-text query, in provider order. `Ok(vec![])`
    /// means no match, including queries too short to send.
    pub async fn lookup_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Coordinates>, GeocodingError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let count = limit.max(1).to_string();
        tracing::debug!(query, count = %count, "searching locations");

        let res = self
            .http
            .get(&self.search_url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", LANGUAGE),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let body = res.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| GeocodingError::Parse(e.to_string()))?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(SearchResult::into_coordinates)
            .collect())
    }

    /// Best-guess place for a coordinate pair. `Ok(None)` is never produced by
    /// the current provider but is kept for providers that answer "no data".
    pub async fn lookup_reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Coordinates>, GeocodingError> {
        tracing::debug!(latitude, longitude, "reverse geocoding");

        let res = self
            .http
            .get(&self.reverse_url)
            .query(&[
                ("latitude", latitude.to_string().as_str()),
                ("longitude", longitude.to_string().as_str()),
                ("localityLanguage", LANGUAGE),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let body = res.text().await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodingError::Parse(e.to_string()))?;

        Ok(Some(parsed.into_coordinates(latitude, longitude)))
    }

    /// Search-as-you-type entry point. Never fails; failures log and yield nothing.
    pub async fn search_locations(&self, query: &str, limit: usize) -> Vec<Coordinates> {
        match self.lookup_locations(query, limit).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(query, error = %err, "location search failed");
                Vec::new()
            }
        }
    }

    /// First candidate for a query, if any.
    pub async fn resolve_single(&self, query: &str) -> Option<Coordinates> {
        self.search_locations(query, 1).await.into_iter().next()
    }

    pub async fn resolve_from_coordinates(&self, latitude: f64, longitude: f64) -> Option<Coordinates> {
        match self.lookup_reverse(latitude, longitude).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(latitude, longitude, error = %err, "reverse geocoding failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
}

impl SearchResult {
    fn into_coordinates(self) -> Coordinates {
        Coordinates::new(
            self.latitude,
            self.longitude,
            self.name,
            self.country.unwrap_or_default(),
        )
        .with_country_code(self.country_code.as_deref())
        .with_admin1(self.admin1)
    }
}

/// BigDataCloud reverse-geocode-client response. Blank strings mean "unknown".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
}

impl ReverseResponse {
    fn into_coordinates(self, latitude: f64, longitude: f64) -> Coordinates {
        let city = non_blank(self.city)
            .or_else(|| non_blank(self.locality))
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        Coordinates::new(
            latitude,
            longitude,
            city,
            non_blank(self.country_name).unwrap_or_default(),
        )
        .with_country_code(self.country_code.as_deref())
        .with_admin1(self.principal_subdivision)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
