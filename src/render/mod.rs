//! Renderer seam and the renderers that ship with the crate
//!
//! Drawing primitives live outside this crate. A [`Renderer`] receives each
//! [`FrameDescriptor`] once, in emission order, and may not keep the trail
//! slices past the call (the descriptor's lifetime enforces this).
//!
//! - [`FrameLog`] writes each frame's captions through the `log` facade.
//! - [`FrameRecorder`] keeps owned [`FrameRecord`]s for later export.

use crate::animation::FrameDescriptor;
use crate::phases::Phase;
use crate::planetlib::{Body, Position};
use crate::time::Timestamp;
use crate::viewport::{Camera, ViewportScale};
use serde::{Deserialize, Serialize};

/// Consumer of emitted frames
pub trait Renderer {
    /// Draw one frame
    fn render(&mut self, frame: &FrameDescriptor<'_>);
}

impl<F> Renderer for F
where
    F: FnMut(&FrameDescriptor<'_>),
{
    fn render(&mut self, frame: &FrameDescriptor<'_>) {
        self(frame)
    }
}

/// Logs frame captions: every phase start at info level, and every
/// `interval`-th frame at debug level
#[derive(Debug, Clone)]
pub struct FrameLog {
    title: String,
    interval: usize,
}

impl FrameLog {
    /// Create a log renderer with a run title
    pub fn new(title: impl Into<String>, interval: usize) -> Self {
        Self {
            title: title.into(),
            interval: interval.max(1),
        }
    }

    /// Caption lines for a frame, top to bottom
    pub fn captions(&self, frame: &FrameDescriptor<'_>) -> [String; 4] {
        [
            self.title.clone(),
            format!("Date: {}", frame.timestamp),
            format!("{} ({})", frame.phase.title(), frame.counter()),
            frame.info_line(),
        ]
    }
}

impl Renderer for FrameLog {
    fn render(&mut self, frame: &FrameDescriptor<'_>) {
        if frame.phase_start {
            let [title, date, phase, info] = self.captions(frame);
            log::info!("{title} | {date} | {phase} | {info}");
        } else if frame.index % self.interval == 0 {
            log::debug!("{} | {} | {}", frame.timestamp, frame.counter(), frame.info_line());
        }
    }
}

/// A body and where it was drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    pub position: Position,
}

/// Owned snapshot of a rendered frame, without trails
///
/// Trails are recoverable from the preceding records of the same phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    pub timestamp: Timestamp,
    pub phase: Phase,
    pub scale: ViewportScale,
    pub camera: Camera,
    pub bodies: Vec<BodyPosition>,
}

impl From<&FrameDescriptor<'_>> for FrameRecord {
    fn from(frame: &FrameDescriptor<'_>) -> Self {
        Self {
            index: frame.index,
            timestamp: frame.timestamp,
            phase: frame.phase,
            scale: frame.scale,
            camera: frame.camera,
            bodies: frame
                .positions()
                .iter()
                .map(|&(body, position)| BodyPosition { body, position })
                .collect(),
        }
    }
}

/// Renderer that captures every frame as a [`FrameRecord`]
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    frames: Vec<FrameRecord>,
}

impl FrameRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded frames in emission order
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Take ownership of the recorded frames
    pub fn into_frames(self) -> Vec<FrameRecord> {
        self.frames
    }
}

impl Renderer for FrameRecorder {
    fn render(&mut self, frame: &FrameDescriptor<'_>) {
        self.frames.push(FrameRecord::from(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameStateMachine;
    use crate::planetlib::AnalyticEphemeris;
    use crate::time::TimeGrid;

    fn run_into<R: Renderer>(renderer: &mut R) {
        let start = Timestamp::from_ymd(2024, 1, 1).unwrap();
        let grid = TimeGrid::from_days(start, 1, 2).unwrap();
        let eph = AnalyticEphemeris::new();
        let mut machine = FrameStateMachine::new(grid, &eph).unwrap();
        while let Some(frame) = machine.step().unwrap() {
            renderer.render(&frame);
        }
    }

    #[test]
    fn test_recorder_keeps_every_frame() {
        let mut recorder = FrameRecorder::new();
        run_into(&mut recorder);
        let frames = recorder.into_frames();
        assert_eq!(frames.len(), 12);
        assert!(frames.windows(2).all(|w| w[0].index + 1 == w[1].index));
        assert_eq!(frames[0].bodies.len(), 1);
        assert_eq!(frames[11].bodies[1].body, Body::Moon);
    }

    #[test]
    fn test_closure_renderer() {
        let mut seen = Vec::new();
        let mut renderer = |frame: &FrameDescriptor<'_>| seen.push(frame.phase);
        run_into(&mut renderer);
        assert_eq!(seen.len(), 12);
        assert_eq!(seen[4], Phase::SunEarth);
    }

    #[test]
    fn test_captions() {
        let start = Timestamp::from_ymd(2025, 8, 14).unwrap();
        let grid = TimeGrid::from_days(start, 1, 1).unwrap();
        let eph = AnalyticEphemeris::new();
        let mut machine = FrameStateMachine::new(grid, &eph).unwrap();
        let frame = machine.step().unwrap().unwrap();
        let log = FrameLog::new("Sun-Earth-Moon System (Start: 2025-08-14)", 10);
        let [title, date, phase, info] = log.captions(&frame);
        assert_eq!(title, "Sun-Earth-Moon System (Start: 2025-08-14)");
        assert_eq!(date, "Date: 2025-08-14 00:00:00 UTC");
        assert_eq!(phase, "Phase 1: Sun Only (Frame: 1/24)");
        assert_eq!(info, "Establishing heliocentric reference frame");
    }
}
