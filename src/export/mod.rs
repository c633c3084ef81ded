//! Export of a recorded run
//!
//! Exporters consume the ordered [`FrameRecord`]s of a finished run. Export
//! failures are reported to the caller but never invalidate the frames that
//! were already rendered.

use crate::render::FrameRecord;
use crate::time::Timestamp;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: no frames were recorded")]
    EmptyCapture,

    #[error("Invalid frame rate: {0} fps")]
    InvalidFrameRate(u32),

    #[error("File I/O error on {path:?}: {source}")]
    FileError {
        /// The path being written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output target and playback parameters for an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// File to write
    pub output: PathBuf,
    /// Playback frames per second
    pub fps: u32,
    /// Title stored alongside the frames
    pub title: String,
}

impl ExportSettings {
    /// Settings for a run starting at `start`
    ///
    /// Without an explicit output, the file is named after the start date,
    /// e.g. `sun_earth_moon_2024_01_01.json`. An explicit output missing the
    /// extension gets it appended.
    pub fn for_run(start: &Timestamp, output: Option<&Path>, fps: u32, extension: &str) -> Self {
        let output = match output {
            Some(path) if has_extension(path, extension) => path.to_path_buf(),
            Some(path) => {
                let mut name = path.as_os_str().to_owned();
                name.push(".");
                name.push(extension);
                PathBuf::from(name)
            }
            None => PathBuf::from(format!(
                "sun_earth_moon_{}.{}",
                start.file_stem_date(),
                extension
            )),
        };
        Self {
            output,
            fps,
            title: format!("Sun-Earth-Moon System (Start: {})", start.date()),
        }
    }

    /// Playback length of `frame_count` frames, in seconds
    pub fn duration_seconds(&self, frame_count: usize) -> f64 {
        frame_count as f64 / f64::from(self.fps.max(1))
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Writer of a recorded run to a single artifact
pub trait Exporter {
    /// File extension of the artifact, without a dot
    fn extension(&self) -> &'static str;

    /// Write `frames` according to `settings`, returning the written path
    fn export(
        &mut self,
        frames: &[FrameRecord],
        settings: &ExportSettings,
    ) -> Result<PathBuf, ExportError>;
}

#[derive(Serialize)]
struct ExportMetadata<'a> {
    title: &'a str,
    fps: u32,
    frame_count: usize,
    duration_seconds: f64,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    metadata: ExportMetadata<'a>,
    frames: &'a [FrameRecord],
}

/// Writes the run as a single JSON document (metadata plus every frame)
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    /// Compact JSON output
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON output
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Exporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn export(
        &mut self,
        frames: &[FrameRecord],
        settings: &ExportSettings,
    ) -> Result<PathBuf, ExportError> {
        if frames.is_empty() {
            return Err(ExportError::EmptyCapture);
        }
        if settings.fps == 0 {
            return Err(ExportError::InvalidFrameRate(settings.fps));
        }

        let document = ExportDocument {
            metadata: ExportMetadata {
                title: &settings.title,
                fps: settings.fps,
                frame_count: frames.len(),
                duration_seconds: settings.duration_seconds(frames.len()),
                start: frames.first().map(|f| f.timestamp),
                end: frames.last().map(|f| f.timestamp),
            },
            frames,
        };

        let path = settings.output.clone();
        let io_err = |source: std::io::Error| ExportError::FileError {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &document)?;
        } else {
            serde_json::to_writer(&mut writer, &document)?;
        }
        writer.flush().map_err(io_err)?;

        log::info!(
            "Exported {} frames ({:.1}s at {} fps) to {}",
            frames.len(),
            document.metadata.duration_seconds,
            settings.fps,
            path.display()
        );
        Ok(path)
    }
}
