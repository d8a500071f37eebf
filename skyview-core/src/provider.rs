use crate::{
    Config, ForecastError, ForecastRequest, ForecastSnapshot,
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug};

pub mod openmeteo;

/// Upstream services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Forecast,
    Geocoding,
    ReverseGeocoding,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Forecast => "forecast",
            ServiceId::Geocoding => "geocoding",
            ServiceId::ReverseGeocoding => "reverse-geocoding",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::Forecast, ServiceId::Geocoding, ServiceId::ReverseGeocoding]
    }

    /// Public endpoint used when the config does not override it.
    pub fn default_url(&self) -> &'static str {
        match self {
            ServiceId::Forecast => "https://api.open-meteo.com/v1/forecast",
            ServiceId::Geocoding => "https://geocoding-api.open-meteo.com/v1/search",
            ServiceId::ReverseGeocoding => {
                "https://api.bigdatacloud.net/data/reverse-geocode-client"
            }
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "forecast" => Ok(ServiceId::Forecast),
            "geocoding" => Ok(ServiceId::Geocoding),
            "reverse-geocoding" | "reverse" => Ok(ServiceId::ReverseGeocoding),
            _ => Err(anyhow::anyhow!(
                "Unknown service '{value}'. Supported services: forecast, geocoding, reverse-geocoding."
            )),
        }
    }
}

/// Source of normalized forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastSnapshot, ForecastError>;
}

/// Shared HTTP client with the configured per-request timeout.
pub fn http_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("skyview/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Construct the forecast provider from config.
pub fn forecast_provider_from_config(
    config: &Config,
    http: Client,
) -> Box<dyn ForecastProvider> {
    Box::new(OpenMeteoProvider::new(
        http,
        config.endpoint_url(ServiceId::Forecast),
    ))
}
