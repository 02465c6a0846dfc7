use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Divisor for E7 fixed-point coordinates.
pub const E7_DIVISOR: f64 = 10_000_000.0;

// ── Coordinate ────────────────────────────────────────────────────────────────

/// A WGS84 position in decimal degrees.
///
/// Always finite with latitude in `[-90, 90]` and longitude in `[-180, 180]`;
/// the constructors return `None` for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Build a coordinate from E7 fixed-point integers.
    pub fn from_e7(lat_e7: i64, lon_e7: i64) -> Option<Self> {
        Self::new(lat_e7 as f64 / E7_DIVISOR, lon_e7 as f64 / E7_DIVISOR)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.7}°, {:.7}°", self.lat, self.lon)
    }
}

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// Which raw schema (and, for modern exports, which sub-object) produced an
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Legacy `timelineObjects` export.
    #[serde(rename = "timelineObjects")]
    TimelineObjects,
    /// Modern `semanticSegments` export, `visit` or `activity` entries.
    #[serde(rename = "semanticSegments")]
    SemanticSegments,
    /// Modern `semanticSegments` export, distance summed from a `timelinePath`.
    #[serde(rename = "semanticSegments_timelinePath")]
    SemanticSegmentsPath,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::TimelineObjects => "timelineObjects",
            SourceFormat::SemanticSegments => "semanticSegments",
            SourceFormat::SemanticSegmentsPath => "semanticSegments_timelinePath",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// A stay at a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub coordinate: Coordinate,
    /// Start of the stay, in the offset it was recorded with.
    pub start: DateTime<FixedOffset>,
    /// End of the stay. Not guaranteed to be after `start`.
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub place_id: Option<String>,
    /// Address, or the place name when no address was exported.
    #[serde(default)]
    pub label: Option<String>,
    pub source_format: SourceFormat,
}

/// A movement between places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Distance travelled in kilometres, never negative.
    pub distance_km: f64,
    /// Activity label such as `IN_PASSENGER_VEHICLE`.
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub start_coordinate: Option<Coordinate>,
    #[serde(default)]
    pub end_coordinate: Option<Coordinate>,
    pub source_format: SourceFormat,
}

impl Travel {
    /// `true` when this travel's `[start, end)` window overlaps `[start, end)`.
    pub fn overlaps(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        self.start.max(start) < self.end.min(end)
    }
}

/// One normalized timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Visit(Visit),
    Travel(Travel),
}

impl Event {
    pub fn start(&self) -> DateTime<FixedOffset> {
        match self {
            Event::Visit(v) => v.start,
            Event::Travel(t) => t.start,
        }
    }

    pub fn as_visit(&self) -> Option<&Visit> {
        match self {
            Event::Visit(v) => Some(v),
            Event::Travel(_) => None,
        }
    }

    pub fn as_travel(&self) -> Option<&Travel> {
        match self {
            Event::Travel(t) => Some(t),
            Event::Visit(_) => None,
        }
    }
}

impl From<Visit> for Event {
    fn from(v: Visit) -> Self {
        Event::Visit(v)
    }
}

impl From<Travel> for Event {
    fn from(t: Travel) -> Self {
        Event::Travel(t)
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Normalized visits and travels from one export, each sorted by start time.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    visits: Vec<Visit>,
    travels: Vec<Travel>,
}

impl Timeline {
    /// Build a timeline, stably sorting both collections by start timestamp.
    pub fn new(mut visits: Vec<Visit>, mut travels: Vec<Travel>) -> Self {
        visits.sort_by_key(|v| v.start);
        travels.sort_by_key(|t| t.start);
        Self { visits, travels }
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn travels(&self) -> &[Travel] {
        &self.travels
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty() && self.travels.is_empty()
    }

    /// All events starting on `date` (local to each event), visits first,
    /// then stably sorted by start timestamp.
    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .visits
            .iter()
            .filter(|v| v.start.date_naive() == date)
            .cloned()
            .map(Event::from)
            .chain(
                self.travels
                    .iter()
                    .filter(|t| t.start.date_naive() == date)
                    .cloned()
                    .map(Event::from),
            )
            .collect();
        events.sort_by_key(|e| e.start());
        events
    }
}

// ── Resolved places ───────────────────────────────────────────────────────────

/// The geocoded home address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    /// Address as supplied by the user.
    pub query: String,
    /// Formatted address returned by the geocoder.
    pub resolved_address: String,
    pub coordinate: Coordinate,
}

/// One geocoded work destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLocation {
    /// Address as supplied by the user.
    pub query: String,
    /// Formatted address returned by the geocoder.
    pub resolved_address: String,
    pub coordinate: Coordinate,
}

// ── DailyTripRecord ───────────────────────────────────────────────────────────

/// A confirmed Home → Work → Home day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTripRecord {
    pub date: NaiveDate,
    pub work_location: WorkLocation,
    pub outbound_km: f64,
    pub return_km: f64,
    pub total_km: f64,
    pub home_address: String,
    /// Format of the morning home visit that anchored the match.
    pub source_format: SourceFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn visit(start: &str, end: &str) -> Visit {
        Visit {
            coordinate: Coordinate::new(43.0, -79.0).unwrap(),
            start: ts(start),
            end: ts(end),
            place_id: None,
            label: None,
            source_format: SourceFormat::SemanticSegments,
        }
    }

    fn travel(start: &str, end: &str, km: f64) -> Travel {
        Travel {
            start: ts(start),
            end: ts(end),
            distance_km: km,
            activity_type: Some("WALKING".to_string()),
            start_coordinate: None,
            end_coordinate: None,
            source_format: SourceFormat::SemanticSegments,
        }
    }

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(90.0, 180.0).is_some());
        assert!(Coordinate::new(-90.0, -180.0).is_some());
        assert!(Coordinate::new(90.0001, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_coordinate_from_e7() {
        let c = Coordinate::from_e7(438_946_875, -795_587_437).unwrap();
        assert!((c.lat - 43.8946875).abs() < 1e-9);
        assert!((c.lon + 79.5587437).abs() < 1e-9);
        assert!(Coordinate::from_e7(1_000_000_000, 0).is_none());
    }

    #[test]
    fn test_source_format_strings() {
        assert_eq!(SourceFormat::TimelineObjects.to_string(), "timelineObjects");
        assert_eq!(SourceFormat::SemanticSegments.as_str(), "semanticSegments");
        assert_eq!(
            serde_json::to_value(SourceFormat::SemanticSegmentsPath).unwrap(),
            serde_json::json!("semanticSegments_timelinePath")
        );
    }

    #[test]
    fn test_travel_overlap_is_half_open() {
        let t = travel("2024-03-04T08:00:00Z", "2024-03-04T09:00:00Z", 1.0);
        assert!(t.overlaps(ts("2024-03-04T08:30:00Z"), ts("2024-03-04T09:30:00Z")));
        assert!(!t.overlaps(ts("2024-03-04T09:00:00Z"), ts("2024-03-04T10:00:00Z")));
        assert!(!t.overlaps(ts("2024-03-04T07:00:00Z"), ts("2024-03-04T08:00:00Z")));
    }

    #[test]
    fn test_timeline_sorts_by_start() {
        let timeline = Timeline::new(
            vec![
                visit("2024-03-04T17:00:00Z", "2024-03-04T23:00:00Z"),
                visit("2024-03-04T06:00:00Z", "2024-03-04T08:00:00Z"),
            ],
            vec![],
        );
        assert!(timeline.visits()[0].start < timeline.visits()[1].start);
    }

    #[test]
    fn test_events_on_uses_local_date_and_merges() {
        let timeline = Timeline::new(
            vec![
                // 23:30 local on the 4th even though it is the 5th in UTC.
                visit("2024-03-04T23:30:00-05:00", "2024-03-05T07:00:00-05:00"),
                visit("2024-03-04T08:40:00-05:00", "2024-03-04T17:00:00-05:00"),
            ],
            vec![travel("2024-03-04T08:00:00-05:00", "2024-03-04T08:35:00-05:00", 12.0)],
        );

        let events = timeline.events_on(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(events.len(), 3);
        assert!(events[0].as_travel().is_some());
        assert!(events[1].as_visit().is_some());
        assert_eq!(events[2].start().date_naive(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());

        let next = timeline.events_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert!(next.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let e = Event::from(travel("2024-03-04T08:00:00Z", "2024-03-04T09:00:00Z", 3.5));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "travel");
        assert_eq!(json["distance_km"], 3.5);
    }
}
