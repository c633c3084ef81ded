//! Per-body position history for the active phase

use crate::planetlib::{Body, Position};

/// Ordered trail of rendered positions for each body
///
/// Trails only grow within a phase; the frame state machine resets them at
/// every phase boundary, so memory is bounded by the longest phase rather
/// than the whole run.
#[derive(Debug, Clone, Default)]
pub struct TrailBuffer {
    trails: [Vec<Position>; 3],
}

impl TrailBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position to `body`'s trail
    pub fn append(&mut self, body: Body, position: Position) {
        self.trails[body.index()].push(position);
    }

    /// Clear the trails of every body in `bodies`
    pub fn reset(&mut self, bodies: &[Body]) {
        for body in bodies {
            self.trails[body.index()].clear();
        }
    }

    /// Positions accumulated for `body` so far, oldest first
    pub fn snapshot(&self, body: Body) -> &[Position] {
        &self.trails[body.index()]
    }

    /// Length of `body`'s trail
    pub fn len(&self, body: Body) -> usize {
        self.trails[body.index()].len()
    }

    /// Whether every trail is empty
    pub fn is_empty(&self) -> bool {
        self.trails.iter().all(Vec::is_empty)
    }
}
