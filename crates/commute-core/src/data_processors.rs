use serde_json::Value;

use crate::geometry::parse_coordinate_string;
use crate::models::Coordinate;

// ── FieldExtractor ────────────────────────────────────────────────────────────

/// Helpers for pulling typed fields out of loosely-structured export JSON.
///
/// Paths are sequences of object keys; any missing key, `null`, or value of
/// the wrong type yields `None`.
pub struct FieldExtractor;

impl FieldExtractor {
    /// Walk `path` from `data`, returning the value found there.
    pub fn at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
        let mut current = data;
        for key in path {
            current = current.get(key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// String at `path`.
    pub fn str_at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a str> {
        Self::at(data, path).and_then(Value::as_str)
    }

    /// Owned string at `path`, skipping empty strings.
    pub fn string_at(data: &Value, path: &[&str]) -> Option<String> {
        Self::str_at(data, path)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Number at `path`, integer or float.
    pub fn f64_at(data: &Value, path: &[&str]) -> Option<f64> {
        Self::at(data, path).and_then(Value::as_f64)
    }

    /// Integer at `path`. Floats with no fractional part are accepted.
    pub fn i64_at(data: &Value, path: &[&str]) -> Option<i64> {
        let value = Self::at(data, path)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }

    /// First non-empty string among `paths`.
    pub fn first_string(data: &Value, paths: &[&[&str]]) -> Option<String> {
        paths.iter().find_map(|p| Self::string_at(data, p))
    }

    /// Coordinate from an object carrying `latitudeE7` / `longitudeE7`.
    ///
    /// Both keys must be present integers.
    pub fn e7_coordinate(location: &Value) -> Option<Coordinate> {
        let lat = Self::i64_at(location, &["latitudeE7"])?;
        let lon = Self::i64_at(location, &["longitudeE7"])?;
        Coordinate::from_e7(lat, lon)
    }

    /// Coordinate from a `"lat°, lon°"` string at `path`.
    pub fn degree_coordinate(data: &Value, path: &[&str]) -> Option<Coordinate> {
        Self::str_at(data, path).and_then(parse_coordinate_string)
    }

    /// Non-empty array at `path`.
    pub fn non_empty_array<'a>(data: &'a Value, path: &[&str]) -> Option<&'a [Value]> {
        Self::at(data, path)
            .and_then(Value::as_array)
            .filter(|a| !a.is_empty())
            .map(Vec::as_slice)
    }
}
