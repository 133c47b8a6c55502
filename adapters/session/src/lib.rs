#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session facade that wires the world and the scheduler for UI adapters.
//!
//! A [`Session`] owns the simulation for its whole lifecycle: it is built by
//! [`Session::initialize`], driven by [`Session::tick`], and torn down by
//! [`Session::dispose`]. Every committed cell change and every playback jump
//! is forwarded to a [`RenderSink`] so a renderer can redraw incrementally.

use std::time::Duration;

use rumor_mill_core::{
    CellCoord, CellState, Command, Event, GridSize, GridSnapshot, ParameterSource, RunState,
    DEFAULT_STEP_INTERVAL,
};
use rumor_mill_system_scheduler::{Config as SchedulerConfig, Scheduler};
use rumor_mill_world::{self as world, query, History, InitializeError, World};
use tracing::debug;

/// Receives notifications about state a renderer must reflect.
pub trait RenderSink {
    /// A live cell committed a new state.
    fn cell_changed(&mut self, cell: CellCoord, state: CellState);

    /// The view moved to the recorded generation `time`.
    fn generation_viewed(&mut self, _time: usize, _snapshot: &GridSnapshot) {}

    /// The scheduler started or stopped.
    fn run_state_changed(&mut self, _state: RunState) {}
}

/// Sink that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn cell_changed(&mut self, _cell: CellCoord, _state: CellState) {}
}

/// Construction parameters for a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    size: GridSize,
    step_interval: Duration,
    seed: u64,
}

impl SessionConfig {
    /// Creates a configuration for a grid of the provided size.
    #[must_use]
    pub const fn new(size: GridSize, step_interval: Duration, seed: u64) -> Self {
        Self {
            size,
            step_interval,
            seed,
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Delay between scheduled generation advances.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Seed of the simulation's random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(GridSize::new(50, 50), DEFAULT_STEP_INTERVAL, 0)
    }
}

/// Simulation session exposing the operations a UI collaborator needs.
#[derive(Debug)]
pub struct Session<S: RenderSink> {
    world: World,
    scheduler: Scheduler,
    sink: S,
}

impl<S: RenderSink> Session<S> {
    /// Builds the grid and records generation 0.
    pub fn initialize<F>(
        config: SessionConfig,
        initial: F,
        parameters: Box<dyn ParameterSource>,
        sink: S,
    ) -> Result<Self, InitializeError>
    where
        F: FnMut(CellCoord) -> CellState,
    {
        let world = World::initialize(config.size, initial, parameters, config.seed)?;
        let scheduler = Scheduler::new(SchedulerConfig::new(config.step_interval));
        Ok(Self {
            world,
            scheduler,
            sink,
        })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub fn size(&self) -> GridSize {
        query::size(&self.world)
    }

    /// State of the live cell at the provided coordinates.
    #[must_use]
    pub fn state(&self, x: i64, y: i64) -> CellState {
        query::cell_state(&self.world, x, y)
    }

    /// Edits a live cell, returning whether the edit was accepted.
    ///
    /// Edits are only accepted while stopped and viewing the latest
    /// generation; an accepted edit that changes the cell is committed as a
    /// new generation.
    pub fn set_state(&mut self, x: i64, y: i64, state: CellState) -> bool {
        let cell = self.size().wrap(x, y);
        let events = self.submit(Command::SetCellState { cell, state });
        !rejected(&events)
    }

    /// Cycles a live cell to its next state, returning whether it was accepted.
    pub fn toggle_state(&mut self, x: i64, y: i64) -> bool {
        let cell = self.size().wrap(x, y);
        let events = self.submit(Command::ToggleCell { cell });
        !rejected(&events)
    }

    /// Starts advancing generations from the latest one.
    pub fn start(&mut self) {
        let _ = self.submit(Command::SetRunState {
            state: RunState::Running,
        });
    }

    /// Stops advancing generations and cancels any pending step.
    pub fn stop(&mut self) {
        let _ = self.submit(Command::SetRunState {
            state: RunState::Stopped,
        });
    }

    /// Starts when stopped and stops when running.
    pub fn toggle_running(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Reports whether generations are advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        query::is_running(&self.world)
    }

    /// Reports whether no uninformed cell remains.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        query::is_finished(&self.world)
    }

    /// Moves the view to a recorded generation and returns its snapshot.
    ///
    /// Scrubbing stops a running simulation. Indices past the end clamp to
    /// the latest generation. The live grid is never modified.
    pub fn scrub_to(&mut self, time: usize) -> &GridSnapshot {
        let _ = self.submit(Command::ScrubTo { time });
        query::viewed_snapshot(&self.world)
    }

    /// Snapshot of the generation currently being viewed.
    #[must_use]
    pub fn viewed_snapshot(&self) -> &GridSnapshot {
        query::viewed_snapshot(&self.world)
    }

    /// Time index of the generation currently being viewed.
    #[must_use]
    pub fn current_time_index(&self) -> usize {
        query::current_time_index(&self.world)
    }

    /// Time index of the latest generation.
    #[must_use]
    pub fn max_time_index(&self) -> usize {
        query::max_time_index(&self.world)
    }

    /// Reports whether manual edits are currently accepted.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        query::can_edit(&self.world)
    }

    /// Read-only access to the recorded generations.
    #[must_use]
    pub fn history(&self) -> &History {
        query::history(&self.world)
    }

    /// Remaining delay before the next scheduled advance, if one is pending.
    #[must_use]
    pub fn time_until_step(&self) -> Option<Duration> {
        self.scheduler.time_until_step()
    }

    /// Lets `dt` of time elapse, firing the pending step when it is due.
    pub fn tick(&mut self, dt: Duration) {
        let _ = self.submit(Command::Tick { dt });
    }

    /// Shared access to the render sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Exclusive access to the render sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Stops the simulation and returns the recorded history.
    #[must_use]
    pub fn dispose(mut self) -> History {
        self.stop();
        debug!(generations = self.max_time_index() + 1, "session disposed");
        self.world.into_history()
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut commands = vec![command];

        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.notify(&events);
            self.scheduler.handle(&events, &mut commands);
            log.extend(events);
        }

        log
    }

    fn notify(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CellStateChanged { cell, state } => self.sink.cell_changed(*cell, *state),
                Event::GenerationViewed { time } => {
                    let snapshot = query::snapshot_at(&self.world, *time);
                    self.sink.generation_viewed(*time, snapshot);
                }
                Event::RunStateChanged { state } => self.sink.run_state_changed(*state),
                _ => {}
            }
        }
    }
}

fn rejected(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::EditRejected { .. }))
}
