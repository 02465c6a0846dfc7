//! Timeline export loading.
//!
//! Reads the single JSON document produced by a Timeline export and hands it
//! to the [`normalizer`](crate::normalizer).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use commute_core::models::Timeline;
use commute_core::{Result, TrackerError};
use tracing::{debug, info};

use crate::normalizer::normalize;

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and parse the export at `path` as raw JSON.
///
/// A missing or unreadable file yields [`TrackerError::FileRead`]; malformed
/// JSON yields [`TrackerError::JsonParse`].
pub fn read_export(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path).map_err(|source| TrackerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    debug!("Parsed JSON export from {}", path.display());
    Ok(value)
}

/// Load the export at `path` and normalize it into a sorted [`Timeline`].
pub fn load_timeline(path: &Path) -> Result<Timeline> {
    info!("Loading Timeline data from: {}...", path.display());
    let raw = read_export(path)?;
    let timeline = normalize(&raw)?;
    info!(
        "Loaded and parsed {} visits and {} travel segments.",
        timeline.visits().len(),
        timeline.travels().len()
    );
    Ok(timeline)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
