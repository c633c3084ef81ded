//! Top-level driver tying configuration, state machine, renderer and exporter
//!
//! ```no_run
//! use heliophase::config::RunConfig;
//! use heliophase::planetlib::AnalyticEphemeris;
//! use heliophase::render::FrameLog;
//! use heliophase::simulation::Simulation;
//!
//! let ephemeris = AnalyticEphemeris::new();
//! let config = RunConfig::default();
//! let mut renderer = FrameLog::new("Sun-Earth-Moon System", 100);
//! let summary = Simulation::new(config, &ephemeris)?.run(&mut renderer)?;
//! println!("{} frames", summary.frames_rendered);
//! # Ok::<(), heliophase::HeliophaseError>(())
//! ```

use crate::animation::FrameStateMachine;
use crate::config::RunConfig;
use crate::export::{ExportError, ExportSettings, Exporter, JsonExporter};
use crate::planetlib::PositionProvider;
use crate::render::{FrameRecorder, Renderer};
use crate::{HeliophaseError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    /// Frames handed to the renderer
    pub frames_rendered: usize,
    /// Export outcome, when export was requested
    pub export: Option<std::result::Result<PathBuf, ExportError>>,
}

impl RunSummary {
    /// Path of the exported artifact, if export succeeded
    pub fn exported_to(&self) -> Option<&Path> {
        match &self.export {
            Some(Ok(path)) => Some(path),
            _ => None,
        }
    }

    /// Export failure, if export was requested and failed
    pub fn export_error(&self) -> Option<&ExportError> {
        match &self.export {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }
}

/// A configured run against a position provider
pub struct Simulation<'p, P: PositionProvider + ?Sized> {
    config: RunConfig,
    provider: &'p P,
    abort: Option<&'p AtomicBool>,
}

impl<'p, P: PositionProvider + ?Sized> Simulation<'p, P> {
    /// Validate `config` and prepare a run
    pub fn new(config: RunConfig, provider: &'p P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            abort: None,
        })
    }

    /// Stop the run before the next step once `flag` is set
    pub fn with_abort(mut self, flag: &'p AtomicBool) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Configuration of this run
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run to completion, exporting to JSON if the configuration asks for it
    pub fn run<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<RunSummary> {
        if self.config.export {
            let mut exporter = JsonExporter::new();
            self.drive(renderer, Some(&mut exporter as &mut dyn Exporter))
        } else {
            self.drive(renderer, None)
        }
    }

    /// Run to completion and export with `exporter`, regardless of the
    /// configuration's export flag
    pub fn run_with_exporter<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        exporter: &mut dyn Exporter,
    ) -> Result<RunSummary> {
        self.drive(renderer, Some(exporter))
    }

    fn drive<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        exporter: Option<&mut dyn Exporter>,
    ) -> Result<RunSummary> {
        let grid = self.config.time_grid()?;
        let mut machine = FrameStateMachine::new(grid, self.provider)?;
        let mut recorder = exporter.as_ref().map(|_| FrameRecorder::new());

        log::info!(
            "Starting run from {} ({} frames, {}h step, export {})",
            grid.start(),
            grid.len(),
            self.config.step_hours,
            if exporter.is_some() { "on" } else { "off" }
        );
        for span in machine.plan().spans() {
            log::info!("{}: frames {:?}", span.phase, span.frames);
        }

        loop {
            if self.abort.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                let frames_emitted = machine.frames_emitted();
                log::warn!("Run aborted after {} frames", frames_emitted);
                return Err(HeliophaseError::Cancelled { frames_emitted });
            }
            let Some(frame) = machine.step()? else {
                break;
            };
            renderer.render(&frame);
            if let Some(recorder) = recorder.as_mut() {
                recorder.render(&frame);
            }
        }

        let frames_rendered = machine.frames_emitted();
        let export = match (exporter, recorder) {
            (Some(exporter), Some(recorder)) => {
                let settings = ExportSettings::for_run(
                    &grid.start(),
                    self.config.output.as_deref(),
                    self.config.fps,
                    exporter.extension(),
                );
                let outcome = exporter.export(recorder.frames(), &settings);
                if let Err(e) = &outcome {
                    log::error!("Export to {} failed: {}", settings.output.display(), e);
                }
                Some(outcome)
            }
            _ => None,
        };

        Ok(RunSummary {
            frames_rendered,
            export,
        })
    }
}
