use chrono::NaiveDate;
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

use crate::error::{Result, TrackerError};
use crate::geometry::DEFAULT_PROXIMITY_RADIUS_METERS;
use crate::time_utils::parse_date;

/// Default report file name.
pub const DEFAULT_OUTPUT: &str = "travel_report.xlsx";

/// Default Google Geocoding endpoint root.
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Find Home → Work → Home commute days in a Google Timeline export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "commute-tracker",
    about = "Find Home → Work → Home commute days in a Google Timeline export",
    version
)]
pub struct Settings {
    /// Your home address
    #[arg(long, alias = "home_address")]
    pub home_address: String,

    /// One or more work destination addresses
    #[arg(long, alias = "work_destinations", num_args = 1.., required = true)]
    pub work_destinations: Vec<String>,

    /// First day to analyse (YYYY-MM-DD)
    #[arg(long, alias = "start_date")]
    pub start_date: String,

    /// Last day to analyse, inclusive (YYYY-MM-DD)
    #[arg(long, alias = "end_date")]
    pub end_date: String,

    /// Path to the Timeline JSON export
    #[arg(long, alias = "timeline_json")]
    pub timeline_json: PathBuf,

    /// Google Maps Geocoding API key
    #[arg(
        long,
        alias = "api_key",
        env = "GOOGLE_MAPS_API_KEY",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub api_key: SecretString,

    /// Report file (.xlsx, .csv or .json)
    #[arg(long, alias = "output_xlsx", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Proximity radius in metres used to match visits to locations
    #[arg(long, alias = "proximity_radius_m", default_value_t = DEFAULT_PROXIMITY_RADIUS_METERS)]
    pub proximity_radius_m: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Geocoding service root URL
    #[arg(long, default_value = DEFAULT_GEOCODE_BASE_URL, hide = true)]
    pub geocode_base_url: String,
}

fn parse_secret(value: &str) -> std::result::Result<SecretString, String> {
    Ok(SecretString::from(value))
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse and validate the start/end dates.
    ///
    /// Fails when either date is malformed or when the range is inverted.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        if start > end {
            return Err(TrackerError::InvalidDate(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok((start, end))
    }

    /// Proximity radius in metres.
    pub fn radius_m(&self) -> f64 {
        f64::from(self.proximity_radius_m)
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    pub fn api_key(&self) -> SecretString {
        self.api_key.clone()
    }

    /// Work destinations with blank entries removed.
    pub fn work_queries(&self) -> Vec<String> {
        self.work_destinations
            .iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Check the fields clap cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        if self.home_address.trim().is_empty() {
            return Err(TrackerError::Config("home address is empty".to_string()));
        }
        if self.work_queries().is_empty() {
            return Err(TrackerError::Config(
                "at least one work destination is required".to_string(),
            ));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(TrackerError::Config("API key is empty".to_string()));
        }
        self.date_range()?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
