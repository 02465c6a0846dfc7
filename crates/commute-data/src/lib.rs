//! Timeline loading, normalization and commute detection.
//!
//! [`reader`] loads the export, [`normalizer`] maps either schema onto the
//! shared event model, [`matcher`] finds the daily Home → Work → Home
//! sequence and [`analysis`] runs it over a date range.

pub mod analysis;
pub mod matcher;
pub mod normalizer;
pub mod reader;
pub mod report;
