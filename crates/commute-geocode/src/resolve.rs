//! Resolution of the user's home and work addresses.

use commute_core::models::{HomeLocation, WorkLocation};
use commute_core::{Result, TrackerError};
use tracing::{info, warn};

use crate::{GeocodeCandidate, Geocoder};

/// Log every candidate for `label` and pick the first one.
fn select_first(candidates: Vec<GeocodeCandidate>, label: &str) -> Option<GeocodeCandidate> {
    if candidates.is_empty() {
        info!("No geocoding results found for {}", label);
        return None;
    }
    for (i, c) in candidates.iter().enumerate() {
        info!("{} match {}: {} ({})", label, i + 1, c.formatted_address, c.coordinate);
    }
    let selected = candidates.into_iter().next()?;
    info!("Selected for {}: {}", label, selected.formatted_address);
    Some(selected)
}

/// Geocode the home address.
///
/// No candidates yields [`TrackerError::HomeUnresolved`]; a service failure
/// is returned as-is.
pub fn resolve_home(geocoder: &dyn Geocoder, query: &str) -> Result<HomeLocation> {
    let candidates = geocoder.geocode(query)?;
    let selected = select_first(candidates, &format!("Home '{query}'"))
        .ok_or_else(|| TrackerError::HomeUnresolved(query.to_string()))?;
    Ok(HomeLocation {
        query: query.to_string(),
        resolved_address: selected.formatted_address,
        coordinate: selected.coordinate,
    })
}

/// Geocode every work address, in order.
///
/// Addresses that fail or have no match are skipped with a warning. Returns
/// [`TrackerError::NoWorkLocations`] when none could be resolved.
pub fn resolve_work_locations(
    geocoder: &dyn Geocoder,
    queries: &[String],
) -> Result<Vec<WorkLocation>> {
    let mut resolved = Vec::with_capacity(queries.len());

    for query in queries {
        let candidates = match geocoder.geocode(query) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not geocode work address '{}': {}. Skipping it.", query, e);
                continue;
            }
        };
        match select_first(candidates, &format!("Work '{query}'")) {
            Some(selected) => resolved.push(WorkLocation {
                query: query.clone(),
                resolved_address: selected.formatted_address,
                coordinate: selected.coordinate,
            }),
            None => warn!("Could not geocode work address '{}'. Skipping it.", query),
        }
    }

    if resolved.is_empty() {
        return Err(TrackerError::NoWorkLocations);
    }
    Ok(resolved)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
