//! Cyclic navigation between the occurrences of an activated entity.
//!
//! A two-state machine: `Idle` (nothing activated) and `Active` (an entity,
//! its resolved locations, and a position). Stepping wraps around in both
//! directions. Every entry into `Active` — activation, step, re-activation —
//! emits exactly one focus signal for the current location; that signal is
//! the machine's only observable output.

use crate::xref::Location;

/// Receiver of "scroll/focus this location" signals. Fire-and-forget: the
/// cursor never reads anything back.
pub trait FocusSink {
    fn focus(&mut self, location: &Location);
}

/// A sink that drops every signal. Useful when the caller only wants the
/// resulting cursor state.
#[derive(Debug, Default)]
pub struct NullSink;

impl FocusSink for NullSink {
    fn focus(&mut self, _location: &Location) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    Idle,
    Active {
        /// Position of the activated entity in the index.
        entity: usize,
        locations: Vec<Location>,
        /// Zero-based position in `locations`.
        position: usize,
    },
}

#[derive(Debug)]
pub struct NavigationCursor {
    state: CursorState,
}

impl Default for NavigationCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationCursor {
    pub fn new() -> Self {
        Self {
            state: CursorState::Idle,
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CursorState::Active { .. })
    }

    /// Activate `entity` with its resolved locations. With no location the
    /// activation is a no-op and the previous state stays in place. When a
    /// preferred occurrence id is given and present, the cursor starts
    /// there instead of at the first location.
    pub fn activate(
        &mut self,
        entity: usize,
        locations: Vec<Location>,
        preferred: Option<&str>,
        sink: &mut dyn FocusSink,
    ) -> &CursorState {
        if locations.is_empty() {
            return &self.state;
        }
        let position = preferred
            .and_then(|id| locations.iter().position(|l| l.id == id))
            .unwrap_or(0);
        self.state = CursorState::Active {
            entity,
            locations,
            position,
        };
        self.emit(sink);
        &self.state
    }

    /// Step the active cursor by `delta` (usually ±1), wrapping in both
    /// directions. A no-op while idle.
    pub fn step(&mut self, delta: i64, sink: &mut dyn FocusSink) -> &CursorState {
        let stepped = if let CursorState::Active {
            locations,
            position,
            ..
        } = &mut self.state
        {
            let len = locations.len() as i64;
            *position = (*position as i64 + delta).rem_euclid(len) as usize;
            true
        } else {
            false
        };
        if stepped {
            self.emit(sink);
        }
        &self.state
    }

    /// Drop back to `Idle` (search dismissed or index rebuilt).
    pub fn close(&mut self) {
        self.state = CursorState::Idle;
    }

    fn emit(&self, sink: &mut dyn FocusSink) {
        if let CursorState::Active {
            locations,
            position,
            ..
        } = &self.state
        {
            sink.focus(&locations[*position]);
        }
    }
}
