#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative scheduler that paces generation advances.
//!
//! The scheduler never owns a thread. It watches world events, keeps at most
//! one pending step, and converts elapsed time into
//! [`Command::AdvanceGeneration`] requests. The next step is only armed after
//! the previous generation has been committed, so advances never overlap.

use std::time::Duration;

use rumor_mill_core::{Command, Event, RunState, DEFAULT_STEP_INTERVAL};
use tracing::trace;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    step_interval: Duration,
}

impl Config {
    /// Creates a configuration that waits `step_interval` between advances.
    #[must_use]
    pub const fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }

    /// Delay between a committed generation and the next advance.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_INTERVAL)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingStep {
    remaining: Duration,
}

/// Pure system that turns run-state changes and elapsed time into advances.
#[derive(Debug)]
pub struct Scheduler {
    step_interval: Duration,
    run_state: RunState,
    pending: Option<PendingStep>,
}

impl Scheduler {
    /// Creates a stopped scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_interval: config.step_interval,
            run_state: RunState::Stopped,
            pending: None,
        }
    }

    /// Consumes world events and emits advance commands when a step is due.
    ///
    /// Entering the running state requests the first advance immediately.
    /// Each committed generation arms a single step that fires once
    /// `step_interval` of ticked time has elapsed. Stopping clears the pending
    /// step, so nothing fires after a stop.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStateChanged { state } => {
                    self.run_state = *state;
                    self.cancel();
                    if *state == RunState::Running {
                        out.push(Command::AdvanceGeneration);
                    }
                }
                Event::GenerationCommitted { .. } if self.run_state == RunState::Running => {
                    self.arm();
                }
                Event::TimeAdvanced { dt } => {
                    if self.elapse(*dt) {
                        out.push(Command::AdvanceGeneration);
                    }
                }
                _ => {}
            }
        }
    }

    /// Reports whether a step is waiting to fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining delay before the pending step fires, if one is armed.
    #[must_use]
    pub fn time_until_step(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.remaining)
    }

    fn arm(&mut self) {
        self.cancel();
        self.pending = Some(PendingStep {
            remaining: self.step_interval,
        });
        trace!(interval = ?self.step_interval, "step armed");
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            trace!("pending step cancelled");
        }
    }

    fn elapse(&mut self, dt: Duration) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        pending.remaining = pending.remaining.saturating_sub(dt);
        if !pending.remaining.is_zero() {
            return false;
        }

        self.pending = None;
        true
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
