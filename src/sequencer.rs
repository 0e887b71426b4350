//! A replayable, bidirectional step sequencer.
//!
//! The sequencer owns an ordered list of steps and a single cursor. Callers pull steps with
//! [`StepSequencer::advance`] and, between pulls, may ask to see the step they just got again
//! (`Repeat`) or the one before it (`Previous`).
//!
//! "Previous" is a double decrement rather than a history stack, so the sequencer only ever moves
//! back one dispatch at a time. Requests that would push the cursor before the first step fail
//! with [`NavError::OutOfRange`] and leave the cursor where it was.

use thiserror::Error;
use tracing::debug;

/// Errors produced by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    /// Every step has been dispatched. This is the normal end of a session.
    #[error("no more steps in the sequence")]
    Exhausted,

    /// A repeat/previous request would move the cursor before the first step.
    #[error("cannot move back {requested} step(s) from position {position}")]
    OutOfRange { position: usize, requested: usize },
}

/// A navigation request made after a step has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Continue with the following step.
    #[default]
    Next,

    /// Dispatch the step before the one just dispatched.
    Previous,

    /// Dispatch the step just dispatched again.
    Repeat,
}

impl Navigation {
    /// Every choice, in the order we offer them to users.
    pub const ALL: [Navigation; 3] = [Navigation::Next, Navigation::Previous, Navigation::Repeat];

    pub fn label(self) -> &'static str {
        match self {
            Navigation::Next => "next",
            Navigation::Previous => "previous",
            Navigation::Repeat => "repeat",
        }
    }
}

/// Ordered steps plus a cursor in `[0, len]`; `position == len` means the sequence is complete.
#[derive(Debug, Clone)]
pub struct StepSequencer<T> {
    steps: Vec<T>,
    position: usize,
}

impl<T> StepSequencer<T> {
    pub fn new(steps: Vec<T>) -> Self {
        Self { steps, position: 0 }
    }

    /// Return the step under the cursor and move the cursor forward by one.
    pub fn advance(&mut self) -> Result<&T, NavError> {
        let step = self.steps.get(self.position).ok_or(NavError::Exhausted)?;
        self.position += 1;
        Ok(step)
    }

    /// Make the next `advance` return the step that was just returned.
    pub fn queue_repeat(&mut self) -> Result<(), NavError> {
        self.rewind(1)
    }

    /// Make the next `advance` return the step before the one that was just returned.
    pub fn queue_previous(&mut self) -> Result<(), NavError> {
        self.rewind(2)
    }

    /// Apply a navigation request. `Next` leaves the cursor alone.
    pub fn navigate(&mut self, nav: Navigation) -> Result<(), NavError> {
        match nav {
            Navigation::Next => Ok(()),
            Navigation::Previous => self.queue_previous(),
            Navigation::Repeat => self.queue_repeat(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.position == self.steps.len()
    }

    fn rewind(&mut self, requested: usize) -> Result<(), NavError> {
        let position = self
            .position
            .checked_sub(requested)
            .ok_or(NavError::OutOfRange {
                position: self.position,
                requested,
            })?;

        debug!(from = self.position, to = position, "sequencer rewound");
        self.position = position;
        Ok(())
    }
}
