//! HTTP endpoint for the dashboard front end.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skyview_core::{
    ApiResponse, Coordinates, Envelope, ForecastProvider, ForecastQuery, Geocoder, RequestError,
    handle_forecast_request, handler::parse_coordinate,
};
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
    pub geocoder: Arc<Geocoder>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather", get(weather))
        .route("/api/search", get(search))
        .route("/api/reverse", get(reverse))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Cannot bind to {bind}"))?;

    tracing::info!(address = %bind, "listening");
    eprintln!("skyview listening on http://{bind} (Ctrl+C to stop)");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")
}

fn reply<T: Serialize>(resp: ApiResponse<T>) -> Response {
    (resp.status, Json(resp.body)).into_response()
}

async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Response {
    reply(handle_forecast_request(state.provider.as_ref(), &query, Utc::now()).await)
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Envelope<Vec<Coordinates>>> {
    let limit = query.limit.unwrap_or(state.geocoder.default_limit()).max(1);
    let data = state
        .geocoder
        .search_locations(query.q.as_deref().unwrap_or_default(), limit)
        .await;

    Json(Envelope::Data { data })
}

#[derive(Debug, Deserialize)]
struct ReverseQuery {
    lat: Option<String>,
    lon: Option<String>,
}

fn coordinate(raw: Option<&str>, name: &'static str) -> Result<f64, RequestError> {
    let raw = raw
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingParameter(name))?;
    parse_coordinate(raw, name)
}

async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReverseQuery>,
) -> Response {
    let parsed = coordinate(query.lat.as_deref(), "lat")
        .and_then(|lat| Ok((lat, coordinate(query.lon.as_deref(), "lon")?)));
    let (lat, lon) = match parsed {
        Ok(pair) => pair,
        Err(err) => {
            return reply::<Coordinates>(ApiResponse::error(
                StatusCode::BAD_REQUEST,
                err.to_string(),
            ));
        }
    };

    match state.geocoder.resolve_from_coordinates(lat, lon).await {
        Some(place) => reply(ApiResponse::ok(place)),
        None => reply::<Coordinates>(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "No location found for these coordinates.",
        )),
    }
}
