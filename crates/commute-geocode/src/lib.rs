//! Address geocoding.
//!
//! [`Geocoder`] is the seam between the commute tracker and whatever
//! service turns an address into coordinates. [`GoogleGeocoder`] talks to
//! the Google Geocoding API; [`resolve`] turns the user's home and work
//! addresses into resolved locations.

pub mod google;
pub mod resolve;

use commute_core::models::Coordinate;
use commute_core::Result;

pub use google::GoogleGeocoder;
pub use resolve::{resolve_home, resolve_work_locations};

/// One match returned for an address query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub formatted_address: String,
    pub coordinate: Coordinate,
}

/// Anything that can resolve an address string to candidate locations.
pub trait Geocoder {
    /// Candidates for `address`, best first. An empty list means no match.
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>>;
}
