use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::Text;
use skyview_core::{
    Config, ForecastProvider, ForecastRequest, Geocoder, SearchSession, ServiceId,
    debounce::SEARCH_QUIET_PERIOD,
    handler::parse_coordinate,
    provider::{forecast_provider_from_config, http_client},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    output,
    server::{self, AppState},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Weather dashboard backend and CLI")]
pub struct Cli {
    /// Log upstream calls and other debug detail (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Point a service at a different endpoint URL.
    Configure {
        /// Service name: "forecast", "geocoding" or "reverse-geocoding".
        service: String,
    },

    /// Search for places by name.
    Search {
        /// City name or prefix.
        query: Option<String>,

        /// Maximum number of candidates.
        #[arg(long)]
        limit: Option<usize>,

        /// Read queries from stdin, one per line, and print settled results.
        #[arg(long, conflicts_with = "query")]
        live: bool,
    },

    /// Name the place at a coordinate pair.
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },

    /// Forecast for a coordinate pair.
    Forecast {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
        /// Display name for the place.
        #[arg(long)]
        city: String,
    },

    /// Forecast for the best match of a city name.
    Show {
        /// City name.
        city: String,
    },

    /// Run the HTTP endpoint.
    Serve {
        /// Listen address, e.g. 0.0.0.0:8080.
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure { service } => configure(config, &service),
            Command::Search { query, limit, live } => {
                let geocoder = geocoder(&config)?;
                let limit = limit.unwrap_or(geocoder.default_limit());
                if live {
                    live_search(geocoder, limit).await
                } else {
                    let query = query.ok_or_else(|| anyhow!("Give a query or use --live"))?;
                    let found = geocoder.search_locations(&query, limit).await;
                    output::print_candidates(&found);
                    Ok(())
                }
            }
            Command::Locate { lat, lon } => {
                let lat = parse_coordinate(&lat, "lat")?;
                let lon = parse_coordinate(&lon, "lon")?;
                match geocoder(&config)?.resolve_from_coordinates(lat, lon).await {
                    Some(place) => output::print_place(&place),
                    None => println!("No location found for {lat}, {lon}."),
                }
                Ok(())
            }
            Command::Forecast { lat, lon, city } => {
                let lat = parse_coordinate(&lat, "lat")?;
                let lon = parse_coordinate(&lon, "lon")?;
                forecast(&config, lat, lon, &city).await
            }
            Command::Show { city } => {
                let place = geocoder(&config)?
                    .resolve_single(&city)
                    .await
                    .ok_or_else(|| anyhow!("No place found matching '{city}'"))?;
                output::print_place(&place);
                forecast(&config, place.latitude(), place.longitude(), place.city()).await
            }
            Command::Serve { bind } => {
                let http = http_client(&config)?;
                let state = AppState {
                    provider: Arc::from(forecast_provider_from_config(&config, http.clone())),
                    geocoder: Arc::new(Geocoder::from_config(&config, http)),
                };
                let bind = bind.unwrap_or_else(|| config.bind_address().to_string());
                server::serve(state, &bind).await
            }
        }
    }
}

fn geocoder(config: &Config) -> anyhow::Result<Geocoder> {
    Ok(Geocoder::from_config(config, http_client(config)?))
}

fn configure(mut config: Config, service: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(service)?;

    let url = Text::new(&format!("Endpoint URL for {id}:"))
        .with_default(config.endpoint_url(id))
        .prompt()
        .context("Failed to read endpoint URL")?;

    config.upsert_endpoint_url(id, url.trim())?;
    config.save()?;

    println!("Saved {id} endpoint to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn forecast(config: &Config, lat: f64, lon: f64, city: &str) -> anyhow::Result<()> {
    let provider = forecast_provider_from_config(config, http_client(config)?);
    let request = ForecastRequest::new(lat, lon, city, Utc::now());

    let snapshot = provider
        .fetch_forecast(&request)
        .await
        .with_context(|| format!("Failed to fetch forecast for {city}"))?;

    output::print_snapshot(&snapshot);
    Ok(())
}

async fn live_search(geocoder: Geocoder, limit: usize) -> anyhow::Result<()> {
    let (session, mut updates) = SearchSession::new(Arc::new(geocoder), SEARCH_QUIET_PERIOD);
    let mut session = session.with_limit(limit);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) if text.trim().is_empty() => session.dismiss(),
                Some(text) => session.input(&text),
                None => break,
            },
            Some(update) = updates.recv() => output::print_update(&update),
        }
    }

    // Let the last settled query finish before exiting.
    let last = if session.is_pending() {
        updates.recv().await
    } else {
        updates.try_recv().ok()
    };
    if let Some(update) = last {
        output::print_update(&update);
    }
    Ok(())
}
