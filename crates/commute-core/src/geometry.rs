//! Coordinate parsing and great-circle distances.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::models::Coordinate;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default radius in metres used to decide that a visit is "at" a location.
pub const DEFAULT_PROXIMITY_RADIUS_METERS: u32 = 500;

fn lat_lng_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let number = r"[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?";
        Regex::new(&format!(r"^\s*({number})\s*°?\s*,\s*({number})\s*°?\s*$"))
            .expect("regex is valid")
    })
}

/// Parse a `"43.8946875°, -79.5587437°"` string into a [`Coordinate`].
///
/// The degree signs are optional. Malformed or out-of-range input logs a
/// warning and returns `None`.
pub fn parse_coordinate_string(s: &str) -> Option<Coordinate> {
    if s.trim().is_empty() {
        return None;
    }

    let Some(caps) = lat_lng_pattern().captures(s) else {
        warn!("Could not parse degree lat/lon string: \"{}\"", s);
        return None;
    };

    let lat = caps[1].parse::<f64>().ok();
    let lon = caps[2].parse::<f64>().ok();
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            let coord = Coordinate::new(lat, lon);
            if coord.is_none() {
                warn!("Coordinate out of range: \"{}\"", s);
            }
            coord
        }
        _ => {
            warn!("Could not parse degree lat/lon string: \"{}\"", s);
            None
        }
    }
}

/// Haversine distance between `a` and `b` in kilometres.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against h drifting just above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Haversine distance between `a` and `b` in metres.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    distance_km(a, b) * 1000.0
}

/// `true` when both coordinates are present and at most `radius_meters` apart.
pub fn is_near(a: Option<&Coordinate>, b: Option<&Coordinate>, radius_meters: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => distance_meters(a, b) <= radius_meters,
        _ => false,
    }
}

/// Total length in kilometres of a path of optional points.
///
/// Segments with a missing end are skipped; fewer than two points yield 0.
pub fn path_distance_km(points: &[Option<Coordinate>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .windows(2)
        .filter_map(|pair| match (&pair[0], &pair[1]) {
            (Some(a), Some(b)) => Some(distance_km(a, b)),
            _ => None,
        })
        .sum()
}
