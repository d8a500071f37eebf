use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::flag::{self, PLACEHOLDER_FLAG};

/// Closed set of icons the dashboard knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Sunny,
    Cloudy,
    Rainy,
    Storm,
    Snow,
}

impl IconCategory {
    /// Used for unrecognized weather codes and unknown category names.
    pub const FALLBACK: IconCategory = IconCategory::Cloudy;

    /// Map a WMO weather code to an icon. First matching range wins.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_weather_code(code: i64) -> Self {
        match code {
            0 => Self::Sunny,
            1..=3 => Self::Cloudy,
            45 | 48 => Self::Cloudy, // fog
            51..=67 => Self::Rainy,
            71..=77 => Self::Snow,
            80..=82 => Self::Rainy, // showers
            85..=86 => Self::Snow,
            95..=99 => Self::Storm,
            _ => Self::FALLBACK,
        }
    }

    /// Same as [`IconCategory::from_weather_code`], with a missing code mapped to the fallback.
    pub fn from_optional_code(code: Option<i64>) -> Self {
        code.map_or(Self::FALLBACK, Self::from_weather_code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Storm => "storm",
            Self::Snow => "snow",
        }
    }

    /// Resolve a category by name; anything unknown renders as the fallback.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sunny" => Self::Sunny,
            "cloudy" => Self::Cloudy,
            "rainy" => Self::Rainy,
            "storm" => Self::Storm,
            "snow" => Self::Snow,
            _ => Self::FALLBACK,
        }
    }
}

impl std::fmt::Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A resolved place. The flag is derived from the country code and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
    city: String,
    country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flag: Option<String>,
}

impl Coordinates {
    pub fn new(
        latitude: f64,
        longitude: f64,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            city: city.into(),
            country: country.into(),
            country_code: None,
            admin1: None,
            flag: None,
        }
    }

    /// Attach a country code. Blank codes are dropped; others are uppercased,
    /// and a flag is derived only when the code is two ASCII letters.
    pub fn with_country_code(mut self, code: Option<&str>) -> Self {
        let normalized = code.map(flag::normalize_code).filter(|c| !c.is_empty());
        self.flag = normalized
            .as_deref()
            .filter(|c| flag::is_well_formed(c))
            .map(flag::country_flag);
        self.country_code = normalized;
        self
    }

    pub fn with_admin1(mut self, admin1: Option<String>) -> Self {
        self.admin1 = admin1.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn admin1(&self) -> Option<&str> {
        self.admin1.as_deref()
    }

    pub fn flag(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    /// Flag for display; the placeholder when no usable country code exists.
    pub fn display_flag(&self) -> &str {
        self.flag.as_deref().unwrap_or(PLACEHOLDER_FLAG)
    }

    /// "Bagmati, Nepal", or just the country when there is no region.
    pub fn region_label(&self) -> String {
        match self.admin1.as_deref() {
            Some(admin1) if !self.country.is_empty() => format!("{admin1}, {}", self.country),
            Some(admin1) => admin1.to_string(),
            None => self.country.clone(),
        }
    }
}

/// Conditions right now, already rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: i64,
    #[serde(rename = "realFeel")]
    pub feels_like: i64,
    pub chance_of_rain: i64,
    pub uv_index: i64,
    pub wind_speed: f64,
    #[serde(rename = "currentIcon")]
    pub icon: IconCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub time: DateTime<FixedOffset>,
    pub temperature: i64,
    pub uv_index: i64,
    pub icon: IconCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub time: NaiveDate,
    /// "Today" for the first entry, otherwise a weekday abbreviation.
    #[serde(rename = "date")]
    pub label: String,
    pub temperature_max: i64,
    pub temperature_min: i64,
    pub icon: IconCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chance_of_rain: Option<f64>,
}

/// One normalized forecast for one place at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSnapshot {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}

/// Inputs to a forecast fetch. `now` anchors the hourly window.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub now: DateTime<Utc>,
}

impl ForecastRequest {
    pub fn new(latitude: f64, longitude: f64, city: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            city: city.into(),
            now,
        }
    }
}
