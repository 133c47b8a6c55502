#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Rumor Mill.
//!
//! The world owns the live grid, the generation history, the run state and
//! the playback cursor. Adapters and systems mutate it exclusively through
//! [`apply`] and observe it through the [`query`] module.

mod grid;
mod history;

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rumor_mill_core::{
    CellCoord, CellState, Command, EditLock, Event, GridSize, ParameterSource, RunState,
};
use rumor_mill_system_diffusion::{Transition, TransitionEngine};
use tracing::{debug, info, warn};

pub use grid::Grid;
pub use history::History;

/// Errors raised while constructing a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InitializeError {
    /// One of the requested grid dimensions was zero.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
}

/// Represents the authoritative Rumor Mill simulation session.
pub struct World {
    grid: Grid,
    history: History,
    run_state: RunState,
    view_time: usize,
    parameters: Box<dyn ParameterSource>,
    engine: TransitionEngine,
    rng: ChaCha8Rng,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("size", &self.grid.size())
            .field("generations", &self.history.len())
            .field("run_state", &self.run_state)
            .field("view_time", &self.view_time)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Builds the grid from `initial` and records it as generation 0.
    ///
    /// `parameters` is consulted afresh on every generation advance, and
    /// `seed` fixes the random stream so runs can be replayed exactly.
    pub fn initialize<F>(
        size: GridSize,
        initial: F,
        parameters: Box<dyn ParameterSource>,
        seed: u64,
    ) -> Result<Self, InitializeError>
    where
        F: FnMut(CellCoord) -> CellState,
    {
        if size.is_empty() {
            return Err(InitializeError::EmptyGrid {
                width: size.width(),
                height: size.height(),
            });
        }

        let grid = Grid::new(size, initial);
        let history = History::new(grid.snapshot());
        debug!(
            width = size.width(),
            height = size.height(),
            informed = grid.informed_count(),
            "world initialized"
        );

        Ok(Self {
            grid,
            history,
            run_state: RunState::Stopped,
            view_time: 0,
            parameters,
            engine: TransitionEngine,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Consumes the world, yielding the recorded history.
    #[must_use]
    pub fn into_history(self) -> History {
        self.history
    }

    fn can_edit(&self) -> Result<(), EditLock> {
        if self.run_state == RunState::Running {
            Err(EditLock::Running)
        } else if self.view_time != self.history.last_index() {
            Err(EditLock::Scrubbing)
        } else {
            Ok(())
        }
    }

    fn set_run_state(&mut self, state: RunState, out_events: &mut Vec<Event>) {
        if self.run_state == state {
            return;
        }

        if state == RunState::Running {
            let latest = self.history.last_index();
            if self.view_time != latest {
                self.view_time = latest;
                out_events.push(Event::GenerationViewed { time: latest });
            }
        }

        self.run_state = state;
        info!(?state, time = self.view_time, "run state changed");
        out_events.push(Event::RunStateChanged { state });
    }

    fn advance_generation(&mut self, out_events: &mut Vec<Event>) {
        if self.run_state != RunState::Running {
            debug!("ignoring generation advance while stopped");
            return;
        }

        if self.grid.is_finished() {
            let time = self.history.last_index();
            info!(time, "every cell informed; stopping");
            out_events.push(Event::SimulationFinished { time });
            self.set_run_state(RunState::Stopped, out_events);
            return;
        }

        let generation_seed = self.rng.gen::<u64>();
        let reference = self.history.latest().clone();
        let advance = match self
            .engine
            .advance(&reference, self.parameters.as_ref(), generation_seed)
        {
            Transition::Advanced(advance) => advance,
            Transition::Finished => return,
        };

        let (_, newly_informed) = advance.into_parts();
        for cell in newly_informed {
            let _ = self.grid.set(
                i64::from(cell.column()),
                i64::from(cell.row()),
                CellState::Informed,
            );
            out_events.push(Event::CellStateChanged {
                cell,
                state: CellState::Informed,
            });
        }

        self.commit_generation(out_events);
    }

    fn edit_cell<F>(&mut self, cell: CellCoord, next_state: F, out_events: &mut Vec<Event>)
    where
        F: FnOnce(CellState) -> CellState,
    {
        let size = self.grid.size();
        let cell = size.wrap(i64::from(cell.column()), i64::from(cell.row()));

        if let Err(reason) = self.can_edit() {
            warn!(?cell, ?reason, "manual edit ignored");
            out_events.push(Event::EditRejected { cell, reason });
            return;
        }

        let (x, y) = (i64::from(cell.column()), i64::from(cell.row()));
        let state = next_state(self.grid.get(x, y));
        if self.grid.set(x, y, state) == state {
            return;
        }

        out_events.push(Event::CellStateChanged { cell, state });
        self.commit_generation(out_events);
    }

    fn scrub_to(&mut self, time: usize, out_events: &mut Vec<Event>) {
        self.set_run_state(RunState::Stopped, out_events);

        let time = self.history.clamp(time);
        if time != self.view_time {
            self.view_time = time;
            out_events.push(Event::GenerationViewed { time });
        }
    }

    fn commit_generation(&mut self, out_events: &mut Vec<Event>) {
        let informed = self.grid.informed_count();
        let time = self.history.append(self.grid.snapshot());
        self.view_time = time;
        debug!(time, informed, "generation committed");
        out_events.push(Event::GenerationCommitted { time, informed });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::SetRunState { state } => world.set_run_state(state, out_events),
        Command::AdvanceGeneration => world.advance_generation(out_events),
        Command::SetCellState { cell, state } => world.edit_cell(cell, |_| state, out_events),
        Command::ToggleCell { cell } => world.edit_cell(cell, CellState::toggled, out_events),
        Command::ScrubTo { time } => world.scrub_to(time, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rumor_mill_core::{CellState, GridSize, GridSnapshot, RunState};

    use super::{History, World};

    /// Fixed dimensions of the grid.
    #[must_use]
    pub fn size(world: &World) -> GridSize {
        world.grid.size()
    }

    /// State of a live cell, wrapping toroidally.
    #[must_use]
    pub fn cell_state(world: &World, x: i64, y: i64) -> CellState {
        world.grid.get(x, y)
    }

    /// Current run state.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run_state
    }

    /// Reports whether generations are currently advancing.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.run_state == RunState::Running
    }

    /// Reports whether the live grid has no uninformed cell left.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        world.grid.is_finished()
    }

    /// Time index of the generation currently being viewed.
    #[must_use]
    pub fn current_time_index(world: &World) -> usize {
        world.view_time
    }

    /// Time index of the most recent generation.
    #[must_use]
    pub fn max_time_index(world: &World) -> usize {
        world.history.last_index()
    }

    /// Reports whether a manual edit would currently be accepted.
    #[must_use]
    pub fn can_edit(world: &World) -> bool {
        world.can_edit().is_ok()
    }

    /// Snapshot of the generation currently being viewed.
    #[must_use]
    pub fn viewed_snapshot(world: &World) -> &GridSnapshot {
        world.history.restore(world.view_time)
    }

    /// Snapshot recorded at `time`, clamped to the last generation.
    #[must_use]
    pub fn snapshot_at(world: &World, time: usize) -> &GridSnapshot {
        world.history.restore(time)
    }

    /// Read-only access to the full generation history.
    #[must_use]
    pub fn history(world: &World) -> &History {
        &world.history
    }
}
