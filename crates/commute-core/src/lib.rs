//! Shared building blocks for the commute tracker.
//!
//! Domain models for normalized timeline events, the error type, geometry and
//! timestamp helpers, and the command-line settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod geometry;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, TrackerError};
