//! Run configuration
//!
//! A [`RunConfig`] describes one animation run. It can be built in code,
//! loaded from JSON (missing fields take their defaults), and is overridden
//! field by field by the command line.

use crate::constants::{DEFAULT_DURATION_DAYS, DEFAULT_EXPORT_FPS, DEFAULT_STEP_HOURS};
use crate::time::{TimeGrid, Timestamp};
use crate::{HeliophaseError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters of a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// First day of the run (midnight UTC)
    pub start_date: NaiveDate,
    /// Total run length in days
    pub duration_days: u32,
    /// Spacing between frames in hours
    pub step_hours: u32,
    /// Whether to export the recorded run
    pub export: bool,
    /// Export target; derived from the start date when absent
    pub output: Option<PathBuf>,
    /// Playback rate of the export
    pub fps: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap_or(NaiveDate::MIN),
            duration_days: DEFAULT_DURATION_DAYS,
            step_hours: DEFAULT_STEP_HOURS,
            export: false,
            output: None,
            fps: DEFAULT_EXPORT_FPS,
        }
    }
}

impl RunConfig {
    /// Default configuration starting on `start_date`
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            HeliophaseError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Start of the run
    pub fn start(&self) -> Timestamp {
        Timestamp::from_date(self.start_date)
    }

    /// Build the time grid this configuration describes
    pub fn time_grid(&self) -> Result<TimeGrid> {
        Ok(TimeGrid::from_days(
            self.start(),
            self.duration_days,
            self.step_hours,
        )?)
    }

    /// Check the configuration without running it
    pub fn validate(&self) -> Result<()> {
        self.time_grid()?;
        if self.export && self.fps == 0 {
            return Err(HeliophaseError::Config(
                "export frame rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.duration_days, 30);
        assert_eq!(config.step_hours, 1);
        assert_eq!(config.fps, 10);
        assert!(!config.export);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 8, 14).unwrap());
        assert_eq!(config.time_grid().unwrap().len(), 720);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"start_date": "2024-01-01", "export": true}}"#).unwrap();

        let config = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(config.export);
        assert_eq!(config.duration_days, 30);
        assert_eq!(config.output, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"start_date": "2024-01-01", "speed": 3}}"#).unwrap();
        assert!(matches!(
            RunConfig::from_json_file(file.path()),
            Err(HeliophaseError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            RunConfig::from_json_file("/nonexistent/heliophase.json"),
            Err(HeliophaseError::Io(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = RunConfig::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(config.validate().is_ok());

        config.step_hours = 0;
        assert!(matches!(
            config.validate(),
            Err(HeliophaseError::Time(TimeError::InvalidRange { .. }))
        ));

        config.step_hours = 7;
        config.duration_days = 1;
        assert!(config.validate().is_err());

        config.step_hours = 6;
        config.export = true;
        config.fps = 0;
        assert!(matches!(config.validate(), Err(HeliophaseError::Config(_))));
    }
}
