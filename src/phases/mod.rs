//! The three animation phases and the plan that splits a run between them
//!
//! A run always walks through the same three phases in order:
//!
//! | Phase | Bodies        | Viewport |
//! |-------|---------------|----------|
//! | 1     | Sun           | wide     |
//! | 2     | Sun, Earth    | wide     |
//! | 3     | Earth, Moon   | close    |
//!
//! [`PhasePlan`] gives the first and second phase a third of the time grid
//! each (rounded down) and hands the rest, remainder included, to the last.

use crate::planetlib::Body;
use crate::time::TimeGrid;
use crate::viewport::ViewportScale;
use crate::{HeliophaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// One of the three fixed animation segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Sun alone, establishing the heliocentric frame
    SunOnly,
    /// Sun and Earth's orbit
    SunEarth,
    /// Earth-Moon close-up
    EarthMoon,
}

impl Phase {
    /// All phases in playback order
    pub const ALL: [Phase; 3] = [Phase::SunOnly, Phase::SunEarth, Phase::EarthMoon];

    /// One-based phase number
    pub fn number(&self) -> u8 {
        match self {
            Phase::SunOnly => 1,
            Phase::SunEarth => 2,
            Phase::EarthMoon => 3,
        }
    }

    /// Bodies drawn during this phase
    pub fn bodies(&self) -> &'static [Body] {
        match self {
            Phase::SunOnly => &[Body::Sun],
            Phase::SunEarth => &[Body::Sun, Body::Earth],
            Phase::EarthMoon => &[Body::Earth, Body::Moon],
        }
    }

    /// Whether `body` is drawn during this phase
    pub fn includes(&self, body: Body) -> bool {
        self.bodies().contains(&body)
    }

    /// Viewport scale for this phase
    pub fn scale(&self) -> ViewportScale {
        match self {
            Phase::SunOnly | Phase::SunEarth => ViewportScale::Wide,
            Phase::EarthMoon => ViewportScale::Close,
        }
    }

    /// Heading shown on frames of this phase
    pub fn title(&self) -> &'static str {
        match self {
            Phase::SunOnly => "Phase 1: Sun Only",
            Phase::SunEarth => "Phase 2: Sun + Earth Orbit",
            Phase::EarthMoon => "Phase 3: Earth-Moon System",
        }
    }

    /// The phase after this one, if any
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::SunOnly => Some(Phase::SunEarth),
            Phase::SunEarth => Some(Phase::EarthMoon),
            Phase::EarthMoon => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A phase together with the grid indices it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSpan {
    /// Which phase
    pub phase: Phase,
    /// Half-open range of time grid indices
    pub frames: Range<usize>,
}

impl PhaseSpan {
    /// Number of frames in this span
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the span covers no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Partition of a time grid into the three phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    spans: [PhaseSpan; 3],
}

impl PhasePlan {
    /// Split `frame_count` frames into thirds, remainder to the last phase
    pub fn from_frame_count(frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            return Err(HeliophaseError::EmptyGrid);
        }
        let third = frame_count / 3;
        let spans = [
            PhaseSpan {
                phase: Phase::SunOnly,
                frames: 0..third,
            },
            PhaseSpan {
                phase: Phase::SunEarth,
                frames: third..2 * third,
            },
            PhaseSpan {
                phase: Phase::EarthMoon,
                frames: 2 * third..frame_count,
            },
        ];
        Ok(Self { spans })
    }

    /// Plan the phases of a time grid
    pub fn new(grid: &TimeGrid) -> Result<Self> {
        Self::from_frame_count(grid.len())
    }

    /// Spans in playback order
    pub fn spans(&self) -> &[PhaseSpan] {
        &self.spans
    }

    /// Span of a particular phase
    pub fn span(&self, phase: Phase) -> &PhaseSpan {
        &self.spans[usize::from(phase.number() - 1)]
    }

    /// Total frames covered by the plan
    pub fn frame_count(&self) -> usize {
        self.spans[2].frames.end
    }

    /// Phase owning grid index `index`, if within the plan
    pub fn phase_at(&self, index: usize) -> Option<Phase> {
        self.spans
            .iter()
            .find(|span| span.frames.contains(&index))
            .map(|span| span.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;
    use rstest::rstest;

    #[test]
    fn test_phase_body_sets() {
        assert_eq!(Phase::SunOnly.bodies(), &[Body::Sun]);
        assert_eq!(Phase::SunEarth.bodies(), &[Body::Sun, Body::Earth]);
        assert_eq!(Phase::EarthMoon.bodies(), &[Body::Earth, Body::Moon]);
        assert!(!Phase::SunEarth.includes(Body::Moon));
        assert!(!Phase::EarthMoon.includes(Body::Sun));
    }

    #[test]
    fn test_phase_scales() {
        assert_eq!(Phase::SunOnly.scale(), ViewportScale::Wide);
        assert_eq!(Phase::SunEarth.scale(), ViewportScale::Wide);
        assert_eq!(Phase::EarthMoon.scale(), ViewportScale::Close);
    }

    #[test]
    fn test_default_run_split_evenly() {
        let start = Timestamp::from_ymd(2024, 1, 1).unwrap();
        let grid = TimeGrid::from_days(start, 30, 1).unwrap();
        let plan = PhasePlan::new(&grid).unwrap();
        let ranges: Vec<_> = plan.spans().iter().map(|s| s.frames.clone()).collect();
        assert_eq!(ranges, vec![0..240, 240..480, 480..720]);
        assert_eq!(plan.phase_at(239), Some(Phase::SunOnly));
        assert_eq!(plan.phase_at(240), Some(Phase::SunEarth));
        assert_eq!(plan.phase_at(480), Some(Phase::EarthMoon));
        assert_eq!(plan.phase_at(720), None);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    #[case(100)]
    #[case(721)]
    #[case(722)]
    fn test_spans_cover_grid_exactly(#[case] n: usize) {
        let plan = PhasePlan::from_frame_count(n).unwrap();
        let covered: Vec<usize> = plan.spans().iter().flat_map(|s| s.frames.clone()).collect();
        assert_eq!(covered, (0..n).collect::<Vec<_>>());

        // Remainder lands in the final phase
        let first = plan.span(Phase::SunOnly).len();
        assert_eq!(first, n / 3);
        assert_eq!(plan.span(Phase::SunEarth).len(), n / 3);
        assert_eq!(plan.span(Phase::EarthMoon).len(), n - 2 * (n / 3));
        assert_eq!(plan.frame_count(), n);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            PhasePlan::from_frame_count(0),
            Err(HeliophaseError::EmptyGrid)
        ));
    }

    #[test]
    fn test_phase_sequence() {
        assert_eq!(Phase::SunOnly.next(), Some(Phase::SunEarth));
        assert_eq!(Phase::SunEarth.next(), Some(Phase::EarthMoon));
        assert_eq!(Phase::EarthMoon.next(), None);
        let numbers: Vec<u8> = Phase::ALL.iter().map(Phase::number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
