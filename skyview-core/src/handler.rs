//! Validation and envelope mapping for the forecast endpoint.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::RequestError,
    model::{ForecastRequest, ForecastSnapshot},
    provider::ForecastProvider,
};

/// What end users see for any server-side failure; details go to the log only.
pub const SERVER_ERROR_MESSAGE: &str = "Failed to fetch weather data from API.";

/// Raw query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
}

impl ForecastQuery {
    pub fn new(lat: &str, lon: &str, city: &str) -> Self {
        Self {
            lat: Some(lat.to_string()),
            lon: Some(lon.to_string()),
            city: Some(city.to_string()),
        }
    }
}

/// `{ "data": ... }` on success, `{ "error": "..." }` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Data { data: T },
    Error { error: String },
}

impl<T> Envelope<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Data { data } => Some(data),
            Envelope::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Data { .. } => None,
            Envelope::Error { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::Data { data },
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope::Error {
                error: message.into(),
            },
        }
    }
}

/// Check presence of all three parameters, then parse the numbers.
pub fn validate(query: &ForecastQuery, now: DateTime<Utc>) -> Result<ForecastRequest, RequestError> {
    let lat = required(&query.lat, "lat")?;
    let lon = required(&query.lon, "lon")?;
    let city = required(&query.city, "city")?;

    Ok(ForecastRequest::new(
        parse_coordinate(lat, "lat")?,
        parse_coordinate(lon, "lon")?,
        city,
        now,
    ))
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, RequestError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingParameter(name))
}

/// Finite decimal degrees. No range check; the provider decides what it accepts.
pub fn parse_coordinate(raw: &str, name: &'static str) -> Result<f64, RequestError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RequestError::InvalidParameter {
            name,
            value: raw.to_string(),
        })
}

pub async fn handle_forecast_request(
    provider: &dyn ForecastProvider,
    query: &ForecastQuery,
    now: DateTime<Utc>,
) -> ApiResponse<ForecastSnapshot> {
    let request = match validate(query, now) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "rejecting forecast request");
            return ApiResponse::error(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    match provider.fetch_forecast(&request).await {
        Ok(snapshot) => ApiResponse::ok(snapshot),
        Err(err) => {
            tracing::error!(
                latitude = request.latitude,
                longitude = request.longitude,
                city = %request.city,
                error = ?err,
                "forecast request failed"
            );
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
        }
    }
}
