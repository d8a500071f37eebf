use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ForecastError,
    model::{ForecastRequest, ForecastSnapshot},
    normalize,
};

use super::ForecastProvider;

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,is_day,weather_code,wind_speed_10m,uv_index,precipitation";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,uv_index,precipitation_probability";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,weather_code,precipitation_probability_max,sunrise,sunset";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    url: String,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn fetch_payload(&self, latitude: f64, longitude: f64) -> Result<ForecastPayload, ForecastError> {
        tracing::debug!(latitude, longitude, url = %self.url, "requesting forecast");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string().as_str()),
                ("longitude", longitude.to_string().as_str()),
                ("timezone", "auto"),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
            ])
            .send()
            .await
            .map_err(ForecastError::from_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(ForecastError::from_transport)?;

        if !status.is_success() {
            return Err(ForecastError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ForecastError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastSnapshot, ForecastError> {
        let payload = self.fetch_payload(request.latitude, request.longitude).await?;
        normalize::build_snapshot(&payload, &request.city, request.now)
    }
}

// Wire format. Unrequested fields are ignored; the required blocks and
// time axes must be present or parsing fails.

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: CurrentBlock,
    pub hourly: HourlyBlock,
    pub daily: DailyBlock,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentBlock {
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub apparent_temperature: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i64>>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i64>>,
    #[serde(default)]
    pub precipitation_probability_max: Option<Vec<Option<f64>>>,
}
