//! Forecast pipeline against a mocked provider.

use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use skyview_core::{
    ForecastError, ForecastProvider, ForecastQuery, ForecastRequest, IconCategory,
    handle_forecast_request, handler::SERVER_ERROR_MESSAGE, provider::openmeteo::OpenMeteoProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn new_york_payload() -> Value {
    let times: Vec<String> = (0..48)
        .map(|h| format!("2024-01-{:02}T{:02}:00", 15 + h / 24, h % 24))
        .collect();
    let temps: Vec<f64> = (0..48).map(|h| h as f64 / 2.0).collect();

    json!({
        "latitude": 40.710335,
        "longitude": -73.99307,
        "generationtime_ms": 0.05,
        "utc_offset_seconds": -18000,
        "timezone": "America/New_York",
        "timezone_abbreviation": "EST",
        "elevation": 32.0,
        "current_units": { "temperature_2m": "°C" },
        "current": {
            "time": "2024-01-15T10:00",
            "interval": 900,
            "temperature_2m": 15.2,
            "apparent_temperature": 13.5,
            "is_day": 1,
            "weather_code": 0,
            "wind_speed_10m": 11.4,
            "uv_index": 2.45,
            "precipitation": 0.0
        },
        "hourly": {
            "time": times,
            "temperature_2m": temps,
            "weather_code": vec![3; 48],
            "uv_index": vec![0.0; 48],
            "precipitation_probability": vec![20; 48]
        },
        "daily": {
            "time": ["2024-01-15", "2024-01-16", "2024-01-17"],
            "temperature_2m_max": [16.0, 9.5, 4.4],
            "temperature_2m_min": [7.1, 2.0, -3.5],
            "weather_code": [0, 63, 73],
            "precipitation_probability_max": [5, 70, 90],
            "sunrise": ["2024-01-15T07:17", "2024-01-16T07:17", "2024-01-17T07:16"],
            "sunset": ["2024-01-15T16:53", "2024-01-16T16:54", "2024-01-17T16:55"]
        }
    })
}

fn provider_for(server: &MockServer) -> OpenMeteoProvider {
    OpenMeteoProvider::new(Client::new(), format!("{}/v1/forecast", server.uri()))
}

#[tokio::test]
async fn end_to_end_new_york_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40.7128"))
        .and(query_param("longitude", "-74.006"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(new_york_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    // 10:30 local (UTC-5) on the first day.
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap();
    let query = ForecastQuery::new("40.7128", "-74.0060", "New York");

    let resp = handle_forecast_request(&provider, &query, now).await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = serde_json::to_value(&resp.body).unwrap();
    assert_eq!(body["data"]["current"]["currentIcon"], "sunny");
    assert_eq!(body["data"]["current"]["temperature"], 15);
    assert_eq!(body["data"]["current"]["realFeel"], 14);
    assert_eq!(body["data"]["current"]["uvIndex"], 2);
    assert_eq!(body["data"]["current"]["chanceOfRain"], 20);
    assert_eq!(body["data"]["city"], "New York");
    assert_eq!(body["data"]["latitude"], 40.710335);

    // First slot at or after 15:30 UTC is 11:00 local (index 11).
    let hourly = body["data"]["hourly"].as_array().unwrap();
    assert_eq!(hourly.len(), 24);
    assert_eq!(hourly[0]["time"], "2024-01-15T11:00:00-05:00");
    assert_eq!(hourly[0]["temperature"], 6);
    assert_eq!(hourly[0]["icon"], "cloudy");

    let daily = body["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[0]["date"], "Today");
    assert_eq!(daily[1]["date"], "Tue");
    assert_eq!(daily[1]["icon"], "rainy");
    assert_eq!(daily[2]["icon"], "snow");
    assert_eq!(daily[2]["temperatureMin"], -3);
}

#[tokio::test]
async fn requests_all_three_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param(
            "current",
            "temperature_2m,apparent_temperature,is_day,weather_code,wind_speed_10m,uv_index,precipitation",
        ))
        .and(query_param(
            "hourly",
            "temperature_2m,weather_code,uv_index,precipitation_probability",
        ))
        .and(query_param(
            "daily",
            "temperature_2m_max,temperature_2m_min,weather_code,precipitation_probability_max,sunrise,sunset",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(new_york_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let request = ForecastRequest::new(40.7128, -74.006, "NYC", Utc::now());

    assert!(provider.fetch_forecast(&request).await.is_ok());
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"error":true,"reason":"Latitude must be in range of -90 to 90°."}"#),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let request = ForecastRequest::new(123.0, 0.0, "Nowhere", Utc::now());

    match provider.fetch_forecast(&request).await {
        Err(ForecastError::Upstream { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("Latitude must be in range"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn upstream_failure_becomes_generic_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway: internal host db-3"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resp =
        handle_forecast_request(&provider, &ForecastQuery::new("1", "2", "X"), Utc::now()).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body.error(), Some(SERVER_ERROR_MESSAGE));
}

#[tokio::test]
async fn malformed_payload_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 1.0,
            "longitude": 2.0,
            "current": { "temperature_2m": 3.0 }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let request = ForecastRequest::new(1.0, 2.0, "X", Utc::now());

    assert!(matches!(
        provider.fetch_forecast(&request).await,
        Err(ForecastError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn missing_city_never_reaches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(new_york_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resp =
        handle_forecast_request(&provider, &ForecastQuery::new("40.7128", "-74.0060", ""), Utc::now())
            .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.error().is_some());
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(new_york_payload())
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let http = Client::builder()
        .timeout(std::time::Duration::from_millis(200))
        .build()
        .unwrap();
    let provider = OpenMeteoProvider::new(http, format!("{}/v1/forecast", server.uri()));
    let request = ForecastRequest::new(1.0, 2.0, "X", Utc::now());

    assert!(matches!(
        provider.fetch_forecast(&request).await,
        Err(ForecastError::Timeout)
    ));
}

#[tokio::test]
async fn current_icon_for_unknown_code_falls_back() {
    let mut payload = new_york_payload();
    payload["current"]["weather_code"] = json!(42);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let snapshot = provider
        .fetch_forecast(&ForecastRequest::new(1.0, 2.0, "X", Utc::now()))
        .await
        .unwrap();

    assert_eq!(snapshot.current.icon, IconCategory::FALLBACK);
}
