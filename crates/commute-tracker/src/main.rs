mod bootstrap;
mod report_writer;

use anyhow::{bail, Context, Result};
use clap::Parser;
use commute_core::formatting::format_km;
use commute_core::settings::Settings;
use commute_data::analysis::analyze_trips;
use commute_data::matcher::TripMatcher;
use commute_data::reader::load_timeline;
use commute_geocode::{resolve_home, resolve_work_locations, GoogleGeocoder};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("Commute Tracker v{} starting", env!("CARGO_PKG_VERSION"));
    settings.validate().context("invalid arguments")?;
    let (start, end) = settings.date_range()?;

    if !settings.timeline_json.exists() {
        bail!(
            "Timeline JSON file not found at '{}'",
            settings.timeline_json.display()
        );
    }

    // ── Geocoding ─────────────────────────────────────────────────────────────
    let geocoder = GoogleGeocoder::new(&settings.geocode_base_url, settings.api_key())
        .context("could not create geocoding client")?;
    let home = resolve_home(&geocoder, settings.home_address.trim())
        .context("home address is required to detect commutes")?;
    let work_locations = resolve_work_locations(&geocoder, &settings.work_queries())
        .context("at least one work destination must resolve")?;

    // ── Timeline ──────────────────────────────────────────────────────────────
    let timeline = load_timeline(&settings.timeline_json).with_context(|| {
        format!(
            "could not load timeline from {}",
            settings.timeline_json.display()
        )
    })?;
    if timeline.is_empty() {
        bail!("Could not extract any visit or travel data from the timeline file.");
    }

    // ── Analysis ──────────────────────────────────────────────────────────────
    tracing::info!("Processing data from {} to {}...", start, end);
    tracing::info!("Using proximity radius: {} meters.", settings.proximity_radius_m);

    let matcher = TripMatcher::new(home, work_locations, settings.radius_m());
    let report = analyze_trips(&timeline, &matcher, start, end);

    if report.is_empty() {
        tracing::info!("No qualifying trips found for the given criteria.");
        return Ok(());
    }

    let format = report_writer::write_report(&settings.output, &report.rows())
        .context("could not save the travel report")?;
    tracing::info!(
        "Report written to {} ({:?})",
        settings.output.display(),
        format
    );
    tracing::info!(
        "Found {} days matching the 'Home -> Work -> Home' pattern.",
        report.records.len()
    );
    tracing::info!(
        "Total kilometers driven for these trips: {}",
        format_km(report.total_km)
    );

    Ok(())
}
