//! Schema normalization for Timeline exports.
//!
//! Two incompatible layouts are in the wild:
//!
//! * the legacy `timelineObjects` list of `placeVisit` / `activitySegment`
//!   entries with E7 coordinates, and
//! * the on-device `semanticSegments` list of `visit` / `activity` /
//!   `timelinePath` entries with `"lat°, lon°"` strings.
//!
//! Both are turned into the same [`Timeline`] of [`Visit`]s and [`Travel`]s.

use chrono::{DateTime, FixedOffset};
use commute_core::data_processors::FieldExtractor;
use commute_core::geometry::path_distance_km;
use commute_core::models::{Coordinate, SourceFormat, Timeline, Travel, Visit};
use commute_core::time_utils::{parse_epoch_millis, parse_timestamp_value};
use commute_core::{Result, TrackerError};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Activity label given to travels derived from a raw `timelinePath`.
pub const PATH_ACTIVITY_TYPE: &str = "PATH_BASED_TRAVEL";

// ── Schema detection ──────────────────────────────────────────────────────────

/// The raw list found at the top of an export, tagged by layout.
#[derive(Debug, Clone, Copy)]
pub enum RawSchema<'a> {
    /// Non-empty `timelineObjects` list.
    Legacy(&'a [Value]),
    /// Non-empty `semanticSegments` list.
    Modern(&'a [Value]),
}

/// Pick the schema of `doc`. A non-empty legacy list wins over a modern one.
pub fn detect_schema(doc: &Value) -> Option<RawSchema<'_>> {
    if let Some(entries) = FieldExtractor::non_empty_array(doc, &["timelineObjects"]) {
        return Some(RawSchema::Legacy(entries));
    }
    FieldExtractor::non_empty_array(doc, &["semanticSegments"]).map(RawSchema::Modern)
}

/// Normalize a parsed export into a sorted [`Timeline`].
///
/// Returns [`TrackerError::EmptyOrUnrecognizedSchema`] when neither list is
/// present and non-empty. Individual malformed entries never fail the call;
/// they are skipped with a warning.
pub fn normalize(doc: &Value) -> Result<Timeline> {
    let (visits, travels) = match detect_schema(doc) {
        Some(RawSchema::Legacy(entries)) => {
            info!("Processing using 'timelineObjects' structure...");
            normalize_timeline_objects(entries)
        }
        Some(RawSchema::Modern(entries)) => {
            info!("No 'timelineObjects' found or empty. Processing using 'semanticSegments' structure...");
            normalize_semantic_segments(entries)
        }
        None => return Err(TrackerError::EmptyOrUnrecognizedSchema),
    };

    Ok(Timeline::new(visits, travels))
}

// ── Legacy: timelineObjects ───────────────────────────────────────────────────

/// Convert `timelineObjects` entries into visits and travels.
pub fn normalize_timeline_objects(entries: &[Value]) -> (Vec<Visit>, Vec<Travel>) {
    let mut visits = Vec::new();
    let mut travels = Vec::new();
    let mut skipped = 0usize;

    for entry in entries {
        if let Some(place_visit) = entry.get("placeVisit") {
            match legacy_visit(place_visit) {
                Some(v) => visits.push(v),
                None => skipped += 1,
            }
        } else if let Some(segment) = entry.get("activitySegment") {
            match legacy_travel(segment) {
                Some(t) => travels.push(t),
                None => skipped += 1,
            }
        }
    }

    debug!(
        "timelineObjects: {} visits, {} travels, {} entries skipped",
        visits.len(),
        travels.len(),
        skipped
    );
    (visits, travels)
}

fn legacy_visit(place_visit: &Value) -> Option<Visit> {
    let location = place_visit.get("location").unwrap_or(&Value::Null);
    let coordinate = FieldExtractor::e7_coordinate(location)?;
    let (start, end) = legacy_duration(place_visit)?;

    Some(Visit {
        coordinate,
        start,
        end,
        place_id: FieldExtractor::string_at(location, &["placeId"]),
        label: FieldExtractor::first_string(location, &[&["address"], &["name"]]),
        source_format: SourceFormat::TimelineObjects,
    })
}

fn legacy_travel(segment: &Value) -> Option<Travel> {
    let (start, end) = legacy_duration(segment)?;
    let distance_m = FieldExtractor::f64_at(segment, &["distance"])?;
    let distance_km = checked_km(distance_m)?;

    let endpoint = |key: &str| segment.get(key).and_then(FieldExtractor::e7_coordinate);

    Some(Travel {
        start,
        end,
        distance_km,
        activity_type: FieldExtractor::string_at(segment, &["activityType"]),
        start_coordinate: endpoint("startLocation"),
        end_coordinate: endpoint("endLocation"),
        source_format: SourceFormat::TimelineObjects,
    })
}

/// Start/end of a legacy `duration` object.
///
/// ISO `startTimestamp`/`endTimestamp` are preferred; older exports only
/// carry `startTimestampMs`/`endTimestampMs`.
fn legacy_duration(item: &Value) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let duration = item.get("duration")?;
    let read = |iso_key: &str, ms_key: &str| match FieldExtractor::at(duration, &[iso_key]) {
        Some(iso) => parse_timestamp_value(Some(iso)),
        None => FieldExtractor::at(duration, &[ms_key]).and_then(parse_epoch_millis),
    };
    let start = read("startTimestamp", "startTimestampMs")?;
    let end = read("endTimestamp", "endTimestampMs")?;
    Some((start, end))
}

// ── Modern: semanticSegments ──────────────────────────────────────────────────

/// Convert `semanticSegments` entries into visits and travels.
///
/// A `timelinePath` becomes a travel only when no travel already produced
/// from an `activity` entry overlaps its window. Only travels emitted
/// earlier in this pass are considered, so the result depends on the order
/// of the input list.
pub fn normalize_semantic_segments(entries: &[Value]) -> (Vec<Visit>, Vec<Travel>) {
    let mut visits = Vec::new();
    let mut travels: Vec<Travel> = Vec::new();
    let mut skipped = 0usize;

    for segment in entries {
        let start = parse_timestamp_value(segment.get("startTime"));
        let end = parse_timestamp_value(segment.get("endTime"));
        let (Some(start), Some(end)) = (start, end) else {
            skipped += 1;
            continue;
        };

        if let Some(visit) = segment.get("visit") {
            match modern_visit(visit, start, end) {
                Some(v) => visits.push(v),
                None => skipped += 1,
            }
        } else if let Some(activity) = segment.get("activity") {
            match modern_travel(activity, start, end) {
                Some(t) => travels.push(t),
                None => skipped += 1,
            }
        } else if let Some(path) = segment.get("timelinePath") {
            if is_covered_by_activity(&travels, start, end) {
                debug!(
                    "timelinePath {} - {} already covered by an activity, skipping",
                    start, end
                );
                continue;
            }
            match path_travel(path, start, end) {
                Some(t) => travels.push(t),
                None => skipped += 1,
            }
        }
    }

    debug!(
        "semanticSegments: {} visits, {} travels, {} entries skipped",
        visits.len(),
        travels.len(),
        skipped
    );
    (visits, travels)
}

fn modern_visit(
    visit: &Value,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Option<Visit> {
    let coordinate =
        FieldExtractor::degree_coordinate(visit, &["topCandidate", "placeLocation", "latLng"])?;

    Some(Visit {
        coordinate,
        start,
        end,
        place_id: FieldExtractor::string_at(visit, &["topCandidate", "placeId"]),
        label: FieldExtractor::string_at(visit, &["topCandidate", "name"]),
        source_format: SourceFormat::SemanticSegments,
    })
}

fn modern_travel(
    activity: &Value,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Option<Travel> {
    let distance_m = FieldExtractor::f64_at(activity, &["distanceMeters"])?;
    let distance_km = checked_km(distance_m)?;

    Some(Travel {
        start,
        end,
        distance_km,
        activity_type: FieldExtractor::string_at(activity, &["topCandidate", "type"]),
        start_coordinate: FieldExtractor::degree_coordinate(activity, &["start", "latLng"]),
        end_coordinate: FieldExtractor::degree_coordinate(activity, &["end", "latLng"]),
        source_format: SourceFormat::SemanticSegments,
    })
}

fn path_travel(
    path: &Value,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Option<Travel> {
    let points: Vec<Option<Coordinate>> = path
        .as_array()
        .map(|samples| {
            samples
                .iter()
                .map(|p| FieldExtractor::degree_coordinate(p, &["point"]))
                .collect()
        })
        .unwrap_or_default();

    let distance_km = path_distance_km(&points);
    if distance_km <= 0.0 {
        return None;
    }

    let mut present = points.iter().flatten();
    let first = present.next().copied();
    let last = present.last().copied().or(first);

    Some(Travel {
        start,
        end,
        distance_km,
        activity_type: Some(PATH_ACTIVITY_TYPE.to_string()),
        start_coordinate: first,
        end_coordinate: last,
        source_format: SourceFormat::SemanticSegmentsPath,
    })
}

/// `true` when an activity-derived travel with a type overlaps `[start, end)`.
fn is_covered_by_activity(
    travels: &[Travel],
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> bool {
    travels.iter().any(|t| {
        t.source_format == SourceFormat::SemanticSegments
            && t.activity_type.is_some()
            && t.overlaps(start, end)
    })
}

/// Metres → kilometres, rejecting negative or non-finite distances.
fn checked_km(distance_m: f64) -> Option<f64> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        warn!("Ignoring invalid travel distance: {} m", distance_m);
        return None;
    }
    Some(distance_m / 1000.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
