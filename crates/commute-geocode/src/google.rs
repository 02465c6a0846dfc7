//! Google Geocoding API client.

use std::time::Duration;

use commute_core::models::Coordinate;
use commute_core::{Result, TrackerError};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{GeocodeCandidate, Geocoder};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Interpret a Geocoding API response body.
///
/// `OK` yields the candidates in service order, `ZERO_RESULTS` an empty
/// list. Any other status is a [`TrackerError::Geocoding`] carrying the
/// service's `error_message` when present. Results with out-of-range
/// coordinates are dropped.
pub fn parse_geocode_response(body: &str) -> Result<Vec<GeocodeCandidate>> {
    let response: GeocodeResponse = serde_json::from_str(body)?;

    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .filter_map(|r| {
                let coordinate = Coordinate::new(r.geometry.location.lat, r.geometry.location.lng);
                if coordinate.is_none() {
                    warn!("Dropping geocode result with invalid coordinates: {}", r.formatted_address);
                }
                coordinate.map(|coordinate| GeocodeCandidate {
                    formatted_address: r.formatted_address,
                    coordinate,
                })
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        status => {
            let detail = response
                .error_message
                .map(|m| format!("{status}: {m}"))
                .unwrap_or_else(|| status.to_string());
            Err(TrackerError::Geocoding(detail))
        }
    }
}

// ── GoogleGeocoder ────────────────────────────────────────────────────────────

/// Blocking client for `GET {base_url}/maps/api/geocode/json`.
#[derive(Clone, Debug)]
pub struct GoogleGeocoder {
    base_url: String,
    api_key: SecretString,
    client: reqwest::blocking::Client,
}

impl GoogleGeocoder {
    /// Create a client against `base_url` (e.g. `https://maps.googleapis.com`).
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackerError::Geocoding(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, GEOCODE_PATH)
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>> {
        debug!("Geocoding '{}'", address);
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("address", address), ("key", self.api_key.expose_secret())])
            .send()
            .map_err(|e| TrackerError::Geocoding(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TrackerError::Geocoding(e.without_url().to_string()))?;
        if !status.is_success() {
            let snippet: String = body.chars().take(256).collect();
            return Err(TrackerError::Geocoding(format!("HTTP {status}: {snippet}")));
        }

        parse_geocode_response(&body)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
