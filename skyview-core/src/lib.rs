//! Core library for the `skyview` weather dashboard.
//!
//! This crate defines:
//! - Location search and reverse geocoding, with country flags
//! - Forecast fetching and normalization into a display-ready snapshot
//! - Validation and response envelopes for the forecast endpoint
//! - Configuration & a debounced search session
//!
//! It is used by `skyview-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod debounce;
pub mod error;
pub mod flag;
pub mod geocoding;
pub mod handler;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod search;

pub use config::{Config, EndpointConfig};
pub use error::{ForecastError, GeocodingError, RequestError};
pub use geocoding::Geocoder;
pub use handler::{ApiResponse, Envelope, ForecastQuery, handle_forecast_request};
pub use model::{
    Coordinates, CurrentConditions, DailyPoint, ForecastRequest, ForecastSnapshot, HourlyPoint,
    IconCategory,
};
pub use provider::{ForecastProvider, ServiceId};
pub use search::{SearchSession, SearchUpdate};
