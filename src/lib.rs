//! Heliophase: phased Sun-Earth-Moon orbital animation engine
//!
//! This crate turns a start date into a sequence of renderable frames showing
//! heliocentric positions of the Sun, Earth and Moon. A run passes through
//! three phases (Sun alone, Sun and Earth, then an Earth-Moon close-up), each
//! with its own body set, viewport scale and freshly reset orbital trails.
//!
//! The pieces, leaf first:
//!
//! - [`time`]: hour-resolution timestamps and the run's [`TimeGrid`]
//! - [`planetlib`]: the [`PositionProvider`] seam and built-in ephemerides
//! - [`phases`]: the three phases and the [`PhasePlan`] splitting a run
//! - [`trails`]: per-body position history
//! - [`animation`]: the [`FrameStateMachine`] emitting frame descriptors
//! - [`render`] / [`export`]: consumers of emitted frames
//! - [`config`] / [`simulation`]: run configuration and the top-level driver

use thiserror::Error;

pub mod animation;
pub mod config;
pub mod constants;
pub mod export;
pub mod phases;
pub mod planetlib;
pub mod render;
pub mod simulation;
pub mod time;
pub mod trails;
pub mod viewport;

// Re-export commonly used types
pub use animation::{FrameDescriptor, FrameStateMachine, MachineState};
pub use phases::{Phase, PhasePlan};
pub use planetlib::{AnalyticEphemeris, Body, Position, PositionProvider};
pub use time::{TimeGrid, Timestamp};
pub use viewport::ViewportScale;

/// Main error type for the heliophase library
#[derive(Debug, Error)]
pub enum HeliophaseError {
    /// Bad start, duration or step; `TimeError::InvalidRange` covers a
    /// duration that is not a positive multiple of the step
    #[error("Time error: {0}")]
    Time(#[from] time::TimeError),

    #[error("Empty time grid: nothing to animate")]
    EmptyGrid,

    #[error("Position lookup failed for {body} at {timestamp}: {source}")]
    PositionLookup {
        /// Body being looked up
        body: Body,
        /// Instant being looked up
        timestamp: Timestamp,
        /// Provider's error
        source: planetlib::EphemerisError,
    },

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run cancelled after {frames_emitted} frames")]
    Cancelled {
        /// Frames emitted before the abort was observed
        frames_emitted: usize,
    },
}

/// Result type for heliophase operations
pub type Result<T> = std::result::Result<T, HeliophaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_names_body_and_time() {
        let timestamp = Timestamp::from_ymd(2024, 1, 11).unwrap();
        let err = HeliophaseError::PositionLookup {
            body: Body::Moon,
            timestamp,
            source: planetlib::EphemerisError::Other("no data".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Position lookup failed for Moon at 2024-01-11 00:00:00 UTC: Ephemeris error: no data"
        );
    }

    #[test]
    fn test_time_error_converts() {
        let err: HeliophaseError = time::TimeError::InvalidDate("2023-02-29".to_string()).into();
        assert!(matches!(err, HeliophaseError::Time(_)));
    }
}
