//! Constants module for ephemeris, time grid and viewport calculations

// Astronomical distances
/// Astronomical Unit in kilometers (per IAU 2012 Resolution B2)
pub const AU_KM: f64 = 149_597_870.700;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Seconds in an hour
pub const HOUR_S: i64 = 3_600;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Days in a Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;

// Run defaults
/// Default total run length in days
pub const DEFAULT_DURATION_DAYS: u32 = 30;
/// Default sample spacing in hours
pub const DEFAULT_STEP_HOURS: u32 = 1;
/// Default playback rate for exported animations
pub const DEFAULT_EXPORT_FPS: u32 = 10;
/// Frames between debug progress messages
pub const PROGRESS_INTERVAL: usize = 100;

// Viewport
/// Half-width of the wide (Sun-Earth) view in AU along x and y
pub const WIDE_HALF_EXTENT_AU: f64 = 2.0;
/// Half-height of the wide view in AU along z
pub const WIDE_HALF_HEIGHT_AU: f64 = 0.5;
/// Half-width of the close (Earth-Moon) view in AU along x and y
pub const CLOSE_HALF_EXTENT_AU: f64 = 0.003;
/// Half-height of the close view in AU along z
pub const CLOSE_HALF_HEIGHT_AU: f64 = CLOSE_HALF_EXTENT_AU / 5.0;
/// Camera elevation for wide phases, in degrees
pub const WIDE_ELEVATION_DEG: f64 = 20.0;
/// Camera elevation for the close phase, in degrees
pub const CLOSE_ELEVATION_DEG: f64 = 15.0;
/// Camera azimuth advance per frame, in degrees
pub const AZIMUTH_STEP_DEG: f64 = 0.5;
