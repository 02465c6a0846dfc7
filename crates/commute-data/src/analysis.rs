//! Date-range analysis pipeline.
//!
//! Walks every calendar day in the requested range, runs the
//! [`TripMatcher`] over that day's events and collects the qualifying days
//! into a [`TripReport`].

use chrono::NaiveDate;
use commute_core::formatting::format_km;
use commute_core::models::{DailyTripRecord, Timeline};
use commute_core::time_utils::days_inclusive;
use tracing::{debug, info};

use crate::matcher::TripMatcher;
use crate::report::{ReportAssembler, ReportRow};

// ── Public types ──────────────────────────────────────────────────────────────

/// The complete output of [`analyze_trips`].
#[derive(Debug, Clone)]
pub struct TripReport {
    /// One record per qualifying day, in date order.
    pub records: Vec<DailyTripRecord>,
    /// Sum of `total_km` over all records, unrounded.
    pub total_km: f64,
    /// Number of calendar days examined.
    pub days_scanned: usize,
}

impl TripReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows ready for serialization.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.records.iter().map(ReportRow::from).collect()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the matcher over every day from `start` to `end` inclusive.
///
/// Days are evaluated independently; a day with no events is skipped.
pub fn analyze_trips(
    timeline: &Timeline,
    matcher: &TripMatcher,
    start: NaiveDate,
    end: NaiveDate,
) -> TripReport {
    info!("Analyzing trips from {} to {}...", start, end);

    let mut assembler = ReportAssembler::new();
    let mut days_scanned = 0;

    for date in days_inclusive(start, end) {
        days_scanned += 1;
        let events = timeline.events_on(date);
        if events.is_empty() {
            debug!("{}: no events", date);
            continue;
        }
        if let Some(record) = matcher.match_day(date, &events) {
            assembler.push(record);
        }
    }

    let (records, total_km) = assembler.finish();
    info!(
        "Found {} qualifying days out of {} scanned, {} in total.",
        records.len(),
        days_scanned,
        format_km(total_km)
    );

    TripReport {
        records,
        total_km,
        days_scanned,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use commute_core::formatting::round_to;
    use commute_core::models::{Coordinate, HomeLocation, SourceFormat, WorkLocation};
    use serde_json::{json, Value};

    const HOME: (f64, f64) = (43.6500, -79.3800);
    const WORK: (f64, f64) = (43.7000, -79.4000);

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn latlng(p: (f64, f64)) -> String {
        format!("{}°, {}°", p.0, p.1)
    }

    fn matcher() -> TripMatcher {
        TripMatcher::new(
            HomeLocation {
                query: "1 Main St".to_string(),
                resolved_address: "1 Main St, Toronto, ON".to_string(),
                coordinate: Coordinate::new(HOME.0, HOME.1).unwrap(),
            },
            vec![WorkLocation {
                query: "Office".to_string(),
                resolved_address: "200 Office Rd, Toronto, ON".to_string(),
                coordinate: Coordinate::new(WORK.0, WORK.1).unwrap(),
            }],
            500.0,
        )
    }

    fn modern_visit(p: (f64, f64), day: &str, start: &str, end: &str) -> Value {
        json!({
            "startTime": format!("{day}T{start}:00.000-05:00"),
            "endTime": format!("{day}T{end}:00.000-05:00"),
            "visit": {"topCandidate": {"placeLocation": {"latLng": latlng(p)}}}
        })
    }

    fn modern_activity(day: &str, start: &str, end: &str, meters: f64) -> Value {
        json!({
            "startTime": format!("{day}T{start}:00.000-05:00"),
            "endTime": format!("{day}T{end}:00.000-05:00"),
            "activity": {"distanceMeters": meters, "topCandidate": {"type": "IN_PASSENGER_VEHICLE"}}
        })
    }

    fn commute_day(day: &str) -> Vec<Value> {
        vec![
            modern_visit(HOME, day, "08:00", "08:05"),
            modern_activity(day, "08:10", "08:30", 5000.0),
            modern_visit(WORK, day, "08:32", "17:00"),
            modern_activity(day, "17:05", "17:25", 5000.0),
            modern_visit(HOME, day, "17:27", "23:00"),
        ]
    }

    #[test]
    fn test_single_commute_day_totals_ten_km() {
        let doc = json!({"semanticSegments": commute_day("2024-01-15")});
        let timeline = normalize(&doc).unwrap();

        let report = analyze_trips(&timeline, &matcher(), date("2024-01-15"), date("2024-01-15"));
        assert_eq!(report.days_scanned, 1);
        assert_eq!(report.records.len(), 1);
        assert_eq!(round_to(report.total_km, 2), 10.0);
        assert_eq!(format_km(report.total_km), "10.00 km");

        let rows = report.rows();
        assert_eq!(rows[0].date, date("2024-01-15"));
        assert_eq!(rows[0].distance_to_work_km, 5.0);
        assert_eq!(rows[0].distance_from_work_km, 5.0);
        assert_eq!(rows[0].source_format, "semanticSegments");
    }

    #[test]
    fn test_range_counts_every_day_and_sums_matches() {
        let mut segments = commute_day("2024-01-15");
        segments.extend(commute_day("2024-01-17"));
        let doc = json!({"semanticSegments": segments});
        let timeline = normalize(&doc).unwrap();

        let report = analyze_trips(&timeline, &matcher(), date("2024-01-14"), date("2024-01-18"));
        assert_eq!(report.days_scanned, 5);
        let days: Vec<_> = report.records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(days, vec!["2024-01-15", "2024-01-17"]);
        assert_eq!(round_to(report.total_km, 2), 20.0);
    }

    #[test]
    fn test_days_outside_range_are_ignored() {
        let doc = json!({"semanticSegments": commute_day("2024-01-15")});
        let timeline = normalize(&doc).unwrap();

        let report = analyze_trips(&timeline, &matcher(), date("2024-01-16"), date("2024-01-20"));
        assert!(report.is_empty());
        assert_eq!(report.total_km, 0.0);
        assert_eq!(report.days_scanned, 5);
    }

    #[test]
    fn test_inverted_range_scans_nothing() {
        let doc = json!({"semanticSegments": commute_day("2024-01-15")});
        let timeline = normalize(&doc).unwrap();

        let report = analyze_trips(&timeline, &matcher(), date("2024-01-16"), date("2024-01-15"));
        assert_eq!(report.days_scanned, 0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_legacy_export_produces_same_report() {
        let e7 = |v: f64| (v * 1e7).round() as i64;
        let place = |p: (f64, f64), start: &str, end: &str| {
            json!({"placeVisit": {
                "location": {"latitudeE7": e7(p.0), "longitudeE7": e7(p.1), "address": "somewhere"},
                "duration": {
                    "startTimestamp": format!("2024-01-15T{start}:00.000-05:00"),
                    "endTimestamp": format!("2024-01-15T{end}:00.000-05:00")
                }
            }})
        };
        let segment = |start: &str, end: &str| {
            json!({"activitySegment": {
                "distance": 5000,
                "activityType": "IN_PASSENGER_VEHICLE",
                "duration": {
                    "startTimestamp": format!("2024-01-15T{start}:00.000-05:00"),
                    "endTimestamp": format!("2024-01-15T{end}:00.000-05:00")
                }
            }})
        };
        let doc = json!({"timelineObjects": [
            place(HOME, "08:00", "08:05"),
            segment("08:10", "08:30"),
            place(WORK, "08:32", "17:00"),
            segment("17:05", "17:25"),
            place(HOME, "17:27", "23:00"),
        ]});
        let timeline = normalize(&doc).unwrap();

        let report = analyze_trips(&timeline, &matcher(), date("2024-01-15"), date("2024-01-15"));
        assert_eq!(report.records.len(), 1);
        assert_eq!(round_to(report.total_km, 2), 10.0);
        assert_eq!(report.records[0].source_format, SourceFormat::TimelineObjects);
    }
}
