//! Turns the provider's parallel-array payload into a [`ForecastSnapshot`].
//!
//! Everything here is pure: the current instant is an argument, so the
//! hourly window can be tested without touching the system clock.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::{
    error::ForecastError,
    model::{CurrentConditions, DailyPoint, ForecastSnapshot, HourlyPoint, IconCategory},
    provider::openmeteo::{CurrentBlock, DailyBlock, ForecastPayload, HourlyBlock},
};

/// Maximum number of hourly points in a snapshot.
pub const HOURLY_WINDOW: usize = 24;

const TODAY_LABEL: &str = "Today";

/// Round half up (toward +∞): 21.5 -> 22, -2.5 -> -2.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Missing or non-finite values become 0.
pub fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn rounded(value: Option<f64>) -> i64 {
    round_half_up(finite_or_zero(value))
}

fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}

pub fn build_snapshot(
    payload: &ForecastPayload,
    city: &str,
    now: DateTime<Utc>,
) -> Result<ForecastSnapshot, ForecastError> {
    let offset = FixedOffset::east_opt(payload.utc_offset_seconds).ok_or_else(|| {
        ForecastError::MalformedResponse(format!(
            "utc_offset_seconds out of range: {}",
            payload.utc_offset_seconds
        ))
    })?;

    Ok(ForecastSnapshot {
        city: city.to_string(),
        latitude: payload.latitude,
        longitude: payload.longitude,
        current: current_conditions(&payload.current, &payload.hourly),
        hourly: hourly_window(&payload.hourly, offset, now)?,
        daily: daily_points(&payload.daily)?,
    })
}

/// The current block has absolute precipitation, not a probability, so the
/// chance of rain comes from the first hourly slot.
pub fn current_conditions(current: &CurrentBlock, hourly: &HourlyBlock) -> CurrentConditions {
    CurrentConditions {
        temperature: rounded(current.temperature_2m),
        feels_like: rounded(current.apparent_temperature),
        chance_of_rain: rounded(at(&hourly.precipitation_probability, 0)),
        uv_index: rounded(current.uv_index),
        wind_speed: finite_or_zero(current.wind_speed_10m),
        icon: IconCategory::from_optional_code(current.weather_code),
    }
}

/// Up to [`HOURLY_WINDOW`] points starting at the first slot at or after `now`.
pub fn hourly_window(
    hourly: &HourlyBlock,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<Vec<HourlyPoint>, ForecastError> {
    let times = hourly
        .time
        .iter()
        .map(|t| parse_local_time(t, offset))
        .collect::<Result<Vec<_>, _>>()?;

    let start = window_start(&times, now);

    Ok(times
        .into_iter()
        .enumerate()
        .skip(start)
        .take(HOURLY_WINDOW)
        .map(|(i, time)| HourlyPoint {
            time,
            temperature: rounded(at(&hourly.temperature_2m, i)),
            uv_index: rounded(at(&hourly.uv_index, i)),
            icon: IconCategory::from_optional_code(at(&hourly.weather_code, i)),
        })
        .collect())
}

/// Index of the first timestamp >= `now`, or 0 when every slot is in the past.
pub fn window_start(times: &[DateTime<FixedOffset>], now: DateTime<Utc>) -> usize {
    times
        .iter()
        .position(|t| t.with_timezone(&Utc) >= now)
        .unwrap_or(0)
}

pub fn daily_points(daily: &DailyBlock) -> Result<Vec<DailyPoint>, ForecastError> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                ForecastError::MalformedResponse(format!("bad daily time {raw:?}: {e}"))
            })?;

            Ok(DailyPoint {
                time: date,
                label: day_label(date, i),
                temperature_max: rounded(at(&daily.temperature_2m_max, i)),
                temperature_min: rounded(at(&daily.temperature_2m_min, i)),
                icon: IconCategory::from_optional_code(at(&daily.weather_code, i)),
                chance_of_rain: daily
                    .precipitation_probability_max
                    .as_deref()
                    .map(|series| finite_or_zero(at(series, i))),
            })
        })
        .collect()
}

/// "Today" for the first day, then English weekday abbreviations.
pub fn day_label(date: NaiveDate, index: usize) -> String {
    if index == 0 {
        TODAY_LABEL.to_string()
    } else {
        date.format("%a").to_string()
    }
}

fn parse_local_time(raw: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, ForecastError> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| ForecastError::MalformedResponse(format!("bad hourly time {raw:?}: {e}")))?;

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ForecastError::MalformedResponse(format!("ambiguous hourly time {raw:?}")))
}
