use std::net::TcpListener;

use commute_core::{Result, TrackerError};
use commute_geocode::{GeocodeCandidate, Geocoder, GoogleGeocoder};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key-123";
const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// Run the blocking client off the async test runtime.
async fn geocode(base_url: String, address: &'static str) -> Result<Vec<GeocodeCandidate>> {
    tokio::task::spawn_blocking(move || {
        let geocoder = GoogleGeocoder::new(&base_url, SecretString::from(API_KEY))?;
        geocoder.geocode(address)
    })
    .await
    .expect("geocode task panicked")
}

#[tokio::test]
async fn sends_address_and_key_and_parses_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(query_param("address", "1 Main St, Toronto"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "1 Main St, Toronto, ON M5V, Canada",
                "geometry": {"location": {"lat": 43.65, "lng": -79.38}}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = geocode(server.uri(), "1 Main St, Toronto").await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].formatted_address, "1 Main St, Toronto, ON M5V, Canada");
    assert_eq!(candidates[0].coordinate.lat, 43.65);
    assert_eq!(candidates[0].coordinate.lon, -79.38);
}

#[tokio::test]
async fn zero_results_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ZERO_RESULTS", "results": []})),
        )
        .mount(&server)
        .await;

    let candidates = geocode(server.uri(), "Atlantis").await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn server_error_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = geocode(server.uri(), "1 Main St").await.unwrap_err();
    match err {
        TrackerError::Geocoding(msg) => {
            assert!(msg.starts_with("HTTP 500"), "unexpected message: {msg}");
            assert!(msg.contains("upstream exploded"));
            assert!(!msg.contains(API_KEY));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn request_denied_carries_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .mount(&server)
        .await;

    let err = geocode(server.uri(), "1 Main St").await.unwrap_err();
    match err {
        TrackerError::Geocoding(msg) => {
            assert!(msg.contains("REQUEST_DENIED"));
            assert!(msg.contains("The provided API key is invalid."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn transport_error_does_not_leak_api_key() {
    // Bind then release a port so nothing is listening on it.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let geocoder =
        GoogleGeocoder::new(&format!("http://127.0.0.1:{port}"), SecretString::from(API_KEY))
            .unwrap();

    let err = geocoder.geocode("1 Main St").unwrap_err();
    assert!(matches!(err, TrackerError::Geocoding(_)));
    assert!(!err.to_string().contains(API_KEY));
    assert!(!err.to_string().contains("127.0.0.1"));
}
