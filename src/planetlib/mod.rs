//! Heliocentric positions of the Sun, Earth and Moon
//!
//! The animation core only ever asks one question of an ephemeris: where is
//! this body at this instant? [`PositionProvider`] is that seam. Two
//! implementations ship with the crate:
//!
//! - [`AnalyticEphemeris`], a low-precision series evaluation (Sun's apparent
//!   longitude and the principal lunar terms), good to a few thousandths of
//!   an AU for Earth and well inside the close viewport for the Moon.
//! - [`PrecomputedEphemeris`], a table evaluated once over a [`TimeGrid`]
//!   from any other provider.
//!
//! Positions are in AU, ecliptic of date, with the Sun at the origin.

use crate::constants::AU_KM;
use crate::time::{TimeGrid, Timestamp};
use crate::HeliophaseError;
use chrono::Datelike;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A heliocentric position in AU
pub type Position = Point3<f64>;

/// Error type for ephemeris lookups
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EphemerisError {
    #[error("{timestamp} is outside ephemeris range (years {start_year}..{end_year})")]
    OutOfRange {
        /// The instant that was requested
        timestamp: Timestamp,
        /// First supported year
        start_year: i32,
        /// End of the supported range (exclusive)
        end_year: i32,
    },

    #[error("Ephemeris error: {0}")]
    Other(String),
}

/// The bodies the animation knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Earth,
    Moon,
}

impl Body {
    /// Every body, in rendering order
    pub const ALL: [Body; 3] = [Body::Sun, Body::Earth, Body::Moon];

    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Earth => "Earth",
            Body::Moon => "Moon",
        }
    }

    /// Dense index for per-body storage
    pub(crate) fn index(&self) -> usize {
        match self {
            Body::Sun => 0,
            Body::Earth => 1,
            Body::Moon => 2,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of heliocentric body positions
///
/// Implementations must be deterministic: the same `(body, timestamp)` pair
/// always yields the same position. Lookups are synchronous.
pub trait PositionProvider {
    /// Position of `body` at `timestamp`
    fn position(&self, body: Body, timestamp: &Timestamp) -> Result<Position, EphemerisError>;
}

impl<F> PositionProvider for F
where
    F: Fn(Body, &Timestamp) -> Result<Position, EphemerisError>,
{
    fn position(&self, body: Body, timestamp: &Timestamp) -> Result<Position, EphemerisError> {
        self(body, timestamp)
    }
}

/// Low-precision analytic ephemeris for the Sun, Earth and Moon
///
/// The Sun is pinned to the origin. Earth is placed opposite the Sun's
/// geometric geocentric longitude at the Sun-Earth radius vector, and the
/// Moon adds its geocentric offset from the leading periodic terms of the
/// lunar theory. Valid from 1900-01-01 to 2100-01-01.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticEphemeris {
    start_year: i32,
    end_year: i32,
}

impl Default for AnalyticEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticEphemeris {
    /// Create an ephemeris covering 1900-01-01 to 2100-01-01
    pub fn new() -> Self {
        Self {
            start_year: 1900,
            end_year: 2100,
        }
    }

    /// Supported range as `(first_year, end_year)`, end exclusive
    pub fn year_range(&self) -> (i32, i32) {
        (self.start_year, self.end_year)
    }

    fn check_range(&self, timestamp: &Timestamp) -> Result<(), EphemerisError> {
        let year = timestamp.date().year();
        if year < self.start_year || year >= self.end_year {
            return Err(EphemerisError::OutOfRange {
                timestamp: *timestamp,
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }
        Ok(())
    }

    /// Heliocentric Earth position at `t` Julian centuries from J2000
    fn earth(t: f64) -> Position {
        let l0 = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
        let m = 357.52911 + 35999.05029 * t - 0.0001537 * t * t;
        let e = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
        let m_rad = m.to_radians();

        let center = (1.914602 - 0.004817 * t - 0.000014 * t * t) * m_rad.sin()
            + (0.019993 - 0.000101 * t) * (2.0 * m_rad).sin()
            + 0.000289 * (3.0 * m_rad).sin();
        let sun_longitude = l0 + center;
        let anomaly = (m + center).to_radians();
        let radius = 1.000001018 * (1.0 - e * e) / (1.0 + e * anomaly.cos());

        // Earth sits opposite the Sun's geocentric direction
        let lon = (sun_longitude + 180.0).to_radians();
        Point3::new(radius * lon.cos(), radius * lon.sin(), 0.0)
    }

    /// Geocentric Moon offset in AU at `t` Julian centuries from J2000
    fn moon_offset(t: f64) -> nalgebra::Vector3<f64> {
        let l = 218.3164477 + 481267.88123421 * t;
        let d = (297.8501921 + 445267.1114034 * t).to_radians();
        let m = (357.5291092 + 35999.0502909 * t).to_radians();
        let mp = (134.9633964 + 477198.8675055 * t).to_radians();
        let f = (93.2720950 + 483202.0175233 * t).to_radians();

        let lon = l + 6.288774 * mp.sin()
            + 1.274027 * (2.0 * d - mp).sin()
            + 0.658314 * (2.0 * d).sin()
            + 0.213618 * (2.0 * mp).sin()
            - 0.185116 * m.sin()
            - 0.114332 * (2.0 * f).sin();
        let lat = 5.128122 * f.sin()
            + 0.280602 * (mp + f).sin()
            + 0.277693 * (mp - f).sin()
            + 0.173237 * (2.0 * d - f).sin();
        let dist_km = 385000.56
            - 20905.355 * mp.cos()
            - 3699.111 * (2.0 * d - mp).cos()
            - 2955.968 * (2.0 * d).cos()
            - 569.925 * (2.0 * mp).cos();

        let r = dist_km / AU_KM;
        let (lon, lat) = (lon.to_radians(), lat.to_radians());
        nalgebra::Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        )
    }
}

impl PositionProvider for AnalyticEphemeris {
    fn position(&self, body: Body, timestamp: &Timestamp) -> Result<Position, EphemerisError> {
        self.check_range(timestamp)?;
        let t = timestamp.centuries_since_j2000();
        Ok(match body {
            Body::Sun => Point3::origin(),
            Body::Earth => Self::earth(t),
            Body::Moon => Self::earth(t) + Self::moon_offset(t),
        })
    }
}

/// Positions evaluated once over a time grid and served from a table
///
/// Lookups for instants or bodies not in the table fail; nothing falls back
/// to the source provider after construction.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEphemeris {
    table: HashMap<(Body, Timestamp), Position>,
}

impl PrecomputedEphemeris {
    /// Evaluate `source` for every body in `bodies` at every grid instant
    ///
    /// Fails on the first lookup error.
    pub fn build<P: PositionProvider + ?Sized>(
        source: &P,
        grid: &TimeGrid,
        bodies: &[Body],
    ) -> crate::Result<Self> {
        let mut table = HashMap::with_capacity(grid.len() * bodies.len());
        for (i, ts) in grid.iter().enumerate() {
            if i % crate::constants::PROGRESS_INTERVAL == 0 {
                log::debug!("Precomputing positions {}/{}", i, grid.len());
            }
            for &body in bodies {
                let pos = source
                    .position(body, &ts)
                    .map_err(|source| HeliophaseError::PositionLookup {
                        body,
                        timestamp: ts,
                        source,
                    })?;
                table.insert((body, ts), pos);
            }
        }
        log::info!("Precomputed {} positions", table.len());
        Ok(Self { table })
    }

    /// Number of stored positions
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table holds no positions
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl PositionProvider for PrecomputedEphemeris {
    fn position(&self, body: Body, timestamp: &Timestamp) -> Result<Position, EphemerisError> {
        self.table
            .get(&(body, *timestamp))
            .copied()
            .ok_or_else(|| EphemerisError::Other(format!("{body} not tabulated at {timestamp}")))
    }
}
