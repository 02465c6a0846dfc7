//! Daily Home → Work → Home detection.
//!
//! For one calendar day the matcher walks the merged, time-ordered events and
//! tries each morning home visit as an anchor:
//!
//! 1. an anchor is a visit near home that starts before 13:00 local time;
//! 2. the outbound leg is a travel starting after the anchor ends, directly
//!    followed by a visit near a work location that begins within 10 minutes
//!    of the travel's end;
//! 3. the return leg is the same shape from the work visit back to home.
//!
//! The first anchor that completes both legs decides the day.

use chrono::{DateTime, FixedOffset, NaiveDate};
use commute_core::geometry::is_near;
use commute_core::models::{DailyTripRecord, Event, HomeLocation, Travel, Visit, WorkLocation};
use commute_core::time_utils::{abs_seconds_between, local_time_before};
use tracing::{debug, info};

/// Anchors must start strictly before this local hour.
pub const MORNING_CUTOFF_HOUR: u32 = 13;

/// Maximum gap between a travel's end and the following visit's start.
pub const ADJACENCY_WINDOW_SECS: f64 = 600.0;

// ── Leg ───────────────────────────────────────────────────────────────────────

/// A travel immediately followed by the visit it arrives at.
#[derive(Debug)]
struct Leg<'a, T> {
    travel: &'a Travel,
    arrival: &'a Visit,
    /// Index of `arrival` in the day's event list.
    arrival_idx: usize,
    /// Whatever the arrival predicate matched (e.g. the work location).
    target: T,
}

/// Scan `events[from..]` for a travel starting at or after `not_before` whose
/// next event is a visit starting within [`ADJACENCY_WINDOW_SECS`] of the
/// travel's end and accepted by `accept`.
fn find_leg<'a, T>(
    events: &'a [Event],
    from: usize,
    not_before: DateTime<FixedOffset>,
    mut accept: impl FnMut(&'a Visit) -> Option<T>,
) -> Option<Leg<'a, T>> {
    for idx in from..events.len() {
        let Some(travel) = events[idx].as_travel() else {
            continue;
        };
        if travel.start < not_before {
            continue;
        }
        let Some(arrival) = events.get(idx + 1).and_then(Event::as_visit) else {
            continue;
        };
        if abs_seconds_between(&travel.end, &arrival.start) >= ADJACENCY_WINDOW_SECS {
            continue;
        }
        if let Some(target) = accept(arrival) {
            return Some(Leg {
                travel,
                arrival,
                arrival_idx: idx + 1,
                target,
            });
        }
    }
    None
}

// ── TripMatcher ───────────────────────────────────────────────────────────────

/// Detects at most one qualifying commute per day.
#[derive(Debug, Clone)]
pub struct TripMatcher {
    home: HomeLocation,
    work_locations: Vec<WorkLocation>,
    radius_m: f64,
}

impl TripMatcher {
    /// Create a matcher. Work locations are tried in the given order.
    pub fn new(home: HomeLocation, work_locations: Vec<WorkLocation>, radius_m: f64) -> Self {
        Self {
            home,
            work_locations,
            radius_m,
        }
    }

    pub fn home(&self) -> &HomeLocation {
        &self.home
    }

    pub fn work_locations(&self) -> &[WorkLocation] {
        &self.work_locations
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Run the state machine over one day's events.
    ///
    /// `events` must be the day's visits and travels sorted by start time.
    /// Returns `None` when no anchor completes a full sequence, or when the
    /// first complete sequence has a leg with non-positive distance.
    pub fn match_day(&self, date: NaiveDate, events: &[Event]) -> Option<DailyTripRecord> {
        let mut cursor = 0;

        while cursor < events.len() {
            let Some(anchor) = self.home_anchor(&events[cursor]) else {
                cursor += 1;
                continue;
            };

            let Some(outbound) = find_leg(events, cursor + 1, anchor.end, |v| {
                self.work_location_near(v)
            }) else {
                debug!("{}: anchor at {} has no outbound leg", date, anchor.start);
                cursor += 1;
                continue;
            };

            let Some(inbound) = find_leg(
                events,
                outbound.arrival_idx + 1,
                outbound.arrival.end,
                |v| self.is_home(v).then_some(()),
            ) else {
                debug!("{}: anchor at {} has no return leg", date, anchor.start);
                cursor += 1;
                continue;
            };

            let outbound_km = outbound.travel.distance_km;
            let return_km = inbound.travel.distance_km;
            if outbound_km <= 0.0 || return_km <= 0.0 {
                debug!(
                    "{}: sequence found but leg distances are {} / {} km, day rejected",
                    date, outbound_km, return_km
                );
                return None;
            }

            let record = DailyTripRecord {
                date,
                work_location: outbound.target.clone(),
                outbound_km,
                return_km,
                total_km: outbound_km + return_km,
                home_address: self.home.resolved_address.clone(),
                source_format: anchor.source_format,
            };
            info!(
                "Day {}: Home -> '{}' -> Home. Dist: {:.2} km. Source: {}",
                date, record.work_location.query, record.total_km, record.source_format
            );
            return Some(record);
        }

        None
    }

    /// The visit in `event` if it can anchor a commute.
    fn home_anchor<'a>(&self, event: &'a Event) -> Option<&'a Visit> {
        event
            .as_visit()
            .filter(|v| self.is_home(v) && local_time_before(&v.start, MORNING_CUTOFF_HOUR))
    }

    fn is_home(&self, visit: &Visit) -> bool {
        is_near(
            Some(&visit.coordinate),
            Some(&self.home.coordinate),
            self.radius_m,
        )
    }

    /// First configured work location within radius of `visit`.
    fn work_location_near(&self, visit: &Visit) -> Option<&WorkLocation> {
        self.work_locations
            .iter()
            .find(|w| is_near(Some(&visit.coordinate), Some(&w.coordinate), self.radius_m))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
