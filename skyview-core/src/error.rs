use thiserror::Error;

const MAX_BODY_IN_MESSAGE: usize = 200;

/// Failures while fetching or normalizing a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider answered with a non-success status. `body` is kept verbatim for logs.
    #[error("forecast provider returned status {status}: {}", truncate_body(.body))]
    Upstream { status: u16, body: String },

    #[error("forecast provider returned an unexpected payload: {0}")]
    MalformedResponse(String),

    #[error("forecast request timed out")]
    Timeout,

    #[error("forecast request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ForecastError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForecastError::Timeout
        } else {
            ForecastError::Transport(err)
        }
    }
}

/// Failures inside forward or reverse geocoding. Never shown to end users.
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("geocoding provider returned status {0}")]
    Status(u16),

    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoding response could not be parsed: {0}")]
    Parse(String),
}

/// Problems with the inbound query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Missing latitude, longitude, or city (no '{0}' given)")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {value:?}")]
    InvalidParameter { name: &'static str, value: String },
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() > MAX_BODY_IN_MESSAGE {
        let mut end = MAX_BODY_IN_MESSAGE;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
