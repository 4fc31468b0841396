use std::fmt;

use foundation::time::TimeOffset;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// Enabled state of the navigation controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub previous: bool,
    pub next: bool,
    pub reset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A query is already in flight.
    Busy { target: TimeOffset },
    AtBoundary(Direction),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Busy { target } => {
                write!(f, "a query for {target} is already in flight")
            }
            NavigationError::AtBoundary(Direction::Previous) => {
                write!(f, "already at the first time step")
            }
            NavigationError::AtBoundary(Direction::Next) => {
                write!(f, "already at the last time step")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

/// Time-step navigation with a single in-flight query.
///
/// `current` only changes when a query completes successfully; a failed
/// query leaves the previously shown step in place. Requests made while a
/// query is in flight are rejected, never queued.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: TimeOffset,
    in_flight: Option<TimeOffset>,
}

impl Navigator {
    pub fn new(start: TimeOffset) -> Self {
        Self {
            current: start,
            in_flight: None,
        }
    }

    pub fn current(&self) -> TimeOffset {
        self.current
    }

    pub fn in_flight(&self) -> Option<TimeOffset> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a step in `direction`; returns the t0 offset to load.
    pub fn begin_step(&mut self, direction: Direction) -> Result<TimeOffset, NavigationError> {
        self.ensure_idle()?;
        let target = match direction {
            Direction::Previous => self.current.previous_step(),
            Direction::Next => self.current.next_step(),
        }
        .ok_or(NavigationError::AtBoundary(direction))?;
        self.in_flight = Some(target);
        debug!(from = %self.current, to = %target, "navigation started");
        Ok(target)
    }

    /// Starts reloading the current step.
    pub fn begin_refresh(&mut self) -> Result<TimeOffset, NavigationError> {
        self.ensure_idle()?;
        self.in_flight = Some(self.current);
        Ok(self.current)
    }

    /// Ends the in-flight query. On success the target becomes current.
    pub fn finish(&mut self, success: bool) {
        let Some(target) = self.in_flight.take() else {
            return;
        };
        if success {
            self.current = target;
        }
        debug!(current = %self.current, success, "navigation finished");
    }

    pub fn controls(&self) -> Controls {
        let idle = !self.is_busy();
        Controls {
            previous: idle && self.current.has_previous(),
            next: idle && self.current.has_next(),
            reset: idle,
        }
    }

    fn ensure_idle(&self) -> Result<(), NavigationError> {
        match self.in_flight {
            Some(target) => Err(NavigationError::Busy { target }),
            None => Ok(()),
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(TimeOffset::START)
    }
}
