//! Frame state machine driving the phased animation
//!
//! [`FrameStateMachine`] walks the time grid one timestamp per
//! [`step`](FrameStateMachine::step). Each step looks up the active bodies,
//! extends their trails and hands back a [`FrameDescriptor`] that borrows
//! those trails. Because the descriptor borrows the machine, the borrow
//! checker guarantees a frame is consumed before the next step mutates the
//! trails it points into.
//!
//! ```text
//! Initialized --step--> Running { phase, cursor } --last step--> Completed
//!                              |
//!                        lookup failure
//!                              v
//!                        Failed { cursor }
//! ```

use crate::constants::PROGRESS_INTERVAL;
use crate::phases::{Phase, PhasePlan};
use crate::planetlib::{Body, Position, PositionProvider};
use crate::time::{TimeGrid, Timestamp};
use crate::trails::TrailBuffer;
use crate::viewport::{Camera, ViewportScale};
use crate::{HeliophaseError, Result};

/// Lifecycle of a [`FrameStateMachine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// No frame emitted yet
    Initialized,
    /// Mid-run; `cursor` is the grid index of the next frame
    Running { phase: Phase, cursor: usize },
    /// Every grid timestamp has been emitted
    Completed,
    /// A position lookup failed at grid index `cursor`; nothing more is emitted
    Failed { cursor: usize },
}

/// Everything a renderer needs to draw one frame
///
/// Trail slices are live views into the machine's trail buffer and are only
/// valid until the next step.
#[derive(Debug)]
pub struct FrameDescriptor<'a> {
    /// Zero-based frame index within the run
    pub index: usize,
    /// Total frames in the run
    pub total: usize,
    /// Instant this frame shows
    pub timestamp: Timestamp,
    /// Active phase
    pub phase: Phase,
    /// Active viewport scale
    pub scale: ViewportScale,
    /// Camera framing for this frame
    pub camera: Camera,
    /// Whether this is the first frame of its phase
    pub phase_start: bool,
    positions: Vec<(Body, Position)>,
    trails: &'a TrailBuffer,
}

impl<'a> FrameDescriptor<'a> {
    /// One-based frame number
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Bodies shown in this frame, in phase order
    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.positions.iter().map(|(body, _)| *body)
    }

    /// Current positions of every shown body
    pub fn positions(&self) -> &[(Body, Position)] {
        &self.positions
    }

    /// Current position of `body`, if shown in this frame
    pub fn position(&self, body: Body) -> Option<Position> {
        self.positions
            .iter()
            .find(|(b, _)| *b == body)
            .map(|(_, p)| *p)
    }

    /// Trail of `body` within the current phase, if shown in this frame
    pub fn trail(&self, body: Body) -> Option<&'a [Position]> {
        let trails: &'a TrailBuffer = self.trails;
        self.phase.includes(body).then(|| trails.snapshot(body))
    }

    /// Frame counter caption, e.g. `Frame: 241/720`
    pub fn counter(&self) -> String {
        format!("Frame: {}/{}", self.number(), self.total)
    }

    /// Phase-specific information caption
    pub fn info_line(&self) -> String {
        match self.phase {
            Phase::SunOnly => "Establishing heliocentric reference frame".to_string(),
            Phase::SunEarth => match self.position(Body::Earth) {
                Some(earth) => format!("Earth distance: {:.3} AU", earth.coords.norm()),
                None => String::new(),
            },
            Phase::EarthMoon => match (self.position(Body::Earth), self.position(Body::Moon)) {
                (Some(earth), Some(moon)) => {
                    format!("Moon-Earth distance: {:.6} AU", (moon - earth).norm())
                }
                _ => String::new(),
            },
        }
    }
}

/// Sequential driver turning a time grid into frames
pub struct FrameStateMachine<'p, P: PositionProvider + ?Sized> {
    grid: TimeGrid,
    plan: PhasePlan,
    provider: &'p P,
    trails: TrailBuffer,
    state: MachineState,
    emitted: usize,
}

impl<'p, P: PositionProvider + ?Sized> FrameStateMachine<'p, P> {
    /// Plan the phases of `grid` and prepare to emit its first frame
    pub fn new(grid: TimeGrid, provider: &'p P) -> Result<Self> {
        let plan = PhasePlan::new(&grid)?;
        Ok(Self {
            grid,
            plan,
            provider,
            trails: TrailBuffer::new(),
            state: MachineState::Initialized,
            emitted: 0,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Phase plan for this run
    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    /// Time grid for this run
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Read-only view of the trail buffer
    pub fn trails(&self) -> &TrailBuffer {
        &self.trails
    }

    /// Frames emitted so far
    pub fn frames_emitted(&self) -> usize {
        self.emitted
    }

    /// Whether no further frames will be emitted
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            MachineState::Completed | MachineState::Failed { .. }
        )
    }

    /// Advance one timestamp and emit its frame
    ///
    /// Returns `Ok(None)` once the run is complete (or after a failure). A
    /// failed lookup returns [`HeliophaseError::PositionLookup`] and leaves
    /// the machine in [`MachineState::Failed`].
    pub fn step(&mut self) -> Result<Option<FrameDescriptor<'_>>> {
        let (cursor, previous) = match self.state {
            MachineState::Initialized => (0, None),
            MachineState::Running { phase, cursor } => (cursor, Some(phase)),
            MachineState::Completed | MachineState::Failed { .. } => return Ok(None),
        };

        let (timestamp, phase) = match (self.grid.get(cursor), self.plan.phase_at(cursor)) {
            (Some(ts), Some(phase)) => (ts, phase),
            _ => {
                self.state = MachineState::Completed;
                return Ok(None);
            }
        };

        let total = self.grid.len();
        let phase_start = previous != Some(phase);
        if phase_start {
            if let Some(outgoing) = previous {
                self.trails.reset(outgoing.bodies());
            }
            log::info!(
                "{} begins at frame {}/{} ({}), viewport {}",
                phase,
                cursor + 1,
                total,
                timestamp,
                phase.scale()
            );
        }
        debug_assert!(!phase_start || phase.bodies().iter().all(|b| self.trails.len(*b) == 0));

        // Resolve every body before touching the trails so a failure leaves
        // them as they were after the previous frame
        let mut positions = Vec::with_capacity(phase.bodies().len());
        for &body in phase.bodies() {
            match self.provider.position(body, &timestamp) {
                Ok(position) => positions.push((body, position)),
                Err(source) => {
                    log::debug!("Position lookup for {} at {} failed", body, timestamp);
                    self.state = MachineState::Failed { cursor };
                    return Err(HeliophaseError::PositionLookup {
                        body,
                        timestamp,
                        source,
                    });
                }
            }
        }

        for &(body, position) in &positions {
            self.trails.append(body, position);
        }

        let next = cursor + 1;
        self.state = if next < total {
            MachineState::Running {
                phase,
                cursor: next,
            }
        } else {
            log::info!("Run complete after {} frames", total);
            MachineState::Completed
        };
        self.emitted += 1;
        if cursor % PROGRESS_INTERVAL == 0 {
            log::debug!("Processing frame {}/{}", cursor, total);
        }

        let focus = positions
            .iter()
            .find(|(b, _)| *b == Body::Earth)
            .map(|(_, p)| *p);
        Ok(Some(FrameDescriptor {
            index: cursor,
            total,
            timestamp,
            phase,
            scale: phase.scale(),
            camera: Camera::frame(phase.scale(), focus, cursor),
            phase_start,
            positions,
            trails: &self.trails,
        }))
    }
}
