//! Collects matched days into report rows and a running total.

use chrono::NaiveDate;
use commute_core::formatting::round_to;
use commute_core::models::DailyTripRecord;
use serde::{Deserialize, Serialize};

// ── ReportRow ─────────────────────────────────────────────────────────────────

/// One output row, with distances rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Work Location Visited (Query)")]
    pub work_query: String,
    #[serde(rename = "Work Location Visited (Geocoded)")]
    pub work_resolved: String,
    #[serde(rename = "Distance to Work (km)")]
    pub distance_to_work_km: f64,
    #[serde(rename = "Distance from Work (km)")]
    pub distance_from_work_km: f64,
    #[serde(rename = "Total Distance (km)")]
    pub total_distance_km: f64,
    #[serde(rename = "Home Address (Geocoded)")]
    pub home_address: String,
    #[serde(rename = "Source Format")]
    pub source_format: String,
}

impl ReportRow {
    /// Column headers, in output order.
    pub const COLUMNS: [&'static str; 8] = [
        "Date",
        "Work Location Visited (Query)",
        "Work Location Visited (Geocoded)",
        "Distance to Work (km)",
        "Distance from Work (km)",
        "Total Distance (km)",
        "Home Address (Geocoded)",
        "Source Format",
    ];
}

impl From<&DailyTripRecord> for ReportRow {
    fn from(record: &DailyTripRecord) -> Self {
        Self {
            date: record.date,
            work_query: record.work_location.query.clone(),
            work_resolved: record.work_location.resolved_address.clone(),
            distance_to_work_km: round_to(record.outbound_km, 2),
            distance_from_work_km: round_to(record.return_km, 2),
            total_distance_km: round_to(record.total_km, 2),
            home_address: record.home_address.clone(),
            source_format: record.source_format.to_string(),
        }
    }
}

// ── ReportAssembler ───────────────────────────────────────────────────────────

/// Accumulates [`DailyTripRecord`]s in the order they are produced.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    records: Vec<DailyTripRecord>,
    total_km: f64,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a qualifying day and add its distance to the running total.
    pub fn push(&mut self, record: DailyTripRecord) {
        self.total_km += record.total_km;
        self.records.push(record);
    }

    pub fn records(&self) -> &[DailyTripRecord] {
        &self.records
    }

    /// Unrounded sum of `total_km` over all records.
    pub fn total_km(&self) -> f64 {
        self.total_km
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Consume the assembler, returning the records and the total.
    pub fn finish(self) -> (Vec<DailyTripRecord>, f64) {
        (self.records, self.total_km)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
