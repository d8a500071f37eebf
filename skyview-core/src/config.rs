use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::provider::ServiceId;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Override for a single upstream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
}

/// Top-level configuration stored on disk. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [endpoints.forecast]
    /// url = "https://api.open-meteo.com/v1/forecast"
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointConfig>,

    /// Per-request timeout for every upstream call, in seconds.
    pub timeout_secs: Option<u64>,

    /// Number of candidates returned by a city search.
    pub search_limit: Option<usize>,

    /// Address the HTTP endpoint listens on.
    pub bind_address: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        for (name, endpoint) in &cfg.endpoints {
            let id = ServiceId::try_from(name.as_str())?;
            validate_url(&endpoint.url).with_context(|| format!("Invalid url for '{id}'"))?;
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyview", "skyview-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the url for a service after validating it.
    pub fn upsert_endpoint_url(&mut self, id: ServiceId, url: &str) -> Result<()> {
        validate_url(url)?;
        self.endpoints
            .insert(id.as_str().to_string(), EndpointConfig { url: url.trim().to_string() });
        Ok(())
    }

    /// Configured url for a service, or its public default.
    pub fn endpoint_url(&self, id: ServiceId) -> &str {
        self.endpoints
            .get(id.as_str())
            .map(|e| e.url.as_str())
            .unwrap_or_else(|| id.default_url())
    }

    pub fn is_endpoint_overridden(&self, id: ServiceId) -> bool {
        self.endpoints.contains_key(id.as_str())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.filter(|s| *s > 0).unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1)
    }

    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }
}

fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url.trim()).with_context(|| format!("Invalid URL '{url}'"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("URL must use http or https scheme, got: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ServiceId;

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::default();

        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.search_limit(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(cfg.bind_address(), DEFAULT_BIND_ADDRESS);
        for id in ServiceId::all() {
            assert_eq!(cfg.endpoint_url(*id), id.default_url());
            assert!(!cfg.is_endpoint_overridden(*id));
        }
    }

    #[test]
    fn upsert_overrides_only_that_service() {
        let mut cfg = Config::default();

        cfg.upsert_endpoint_url(ServiceId::Geocoding, "http://localhost:8080/search")
            .expect("valid url");

        assert_eq!(cfg.endpoint_url(ServiceId::Geocoding), "http://localhost:8080/search");
        assert!(cfg.is_endpoint_overridden(ServiceId::Geocoding));
        assert_eq!(cfg.endpoint_url(ServiceId::Forecast), ServiceId::Forecast.default_url());
    }

    #[test]
    fn upsert_rejects_bad_urls() {
        let mut cfg = Config::default();

        let err = cfg.upsert_endpoint_url(ServiceId::Forecast, "not a url").unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));

        let err = cfg
            .upsert_endpoint_url(ServiceId::Forecast, "ftp://example.com/forecast")
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
        assert!(!cfg.is_endpoint_overridden(ServiceId::Forecast));
    }

    #[test]
    fn zero_values_fall_back_to_sane_defaults() {
        let cfg = Config {
            timeout_secs: Some(0),
            search_limit: Some(0),
            ..Config::default()
        };

        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.search_limit(), 1);
    }

    #[test]
    fn parses_toml_file_contents() {
        let cfg = Config::from_toml(
            r#"
timeout_secs = 3
search_limit = 8
bind_address = "0.0.0.0:8080"

[endpoints.reverse-geocoding]
url = "http://127.0.0.1:9000/reverse"
"#,
        )
        .expect("config should parse");

        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.search_limit(), 8);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            cfg.endpoint_url(ServiceId::ReverseGeocoding),
            "http://127.0.0.1:9000/reverse"
        );
    }

    #[test]
    fn toml_with_unknown_service_is_rejected() {
        let err = Config::from_toml(
            r#"
[endpoints.radar]
url = "http://example.com"
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Unknown service"));
    }

    #[test]
    fn save_format_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.upsert_endpoint_url(ServiceId::Forecast, "https://example.com/forecast")
            .expect("valid url");
        cfg.timeout_secs = Some(4);

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");

        assert_eq!(back.endpoint_url(ServiceId::Forecast), "https://example.com/forecast");
        assert_eq!(back.timeout_secs, Some(4));
    }
}
