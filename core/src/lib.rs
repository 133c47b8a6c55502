#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rumor Mill diffusion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! renderers to react to. Systems read immutable [`GridSnapshot`] values and
//! pull tuning values from a [`ParameterSource`] every time they need them.

use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

/// Block side length used when no configuration overrides it.
pub const DEFAULT_NETWORK_SIZE: u32 = 5;

/// Interval between scheduled generation advances.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(750);

/// Adoption state of a single member of the population.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CellState {
    /// The cell has not yet heard the information.
    #[default]
    Uninformed,
    /// The cell has adopted the information. Absorbing under transitions.
    Informed,
}

impl CellState {
    /// Reports whether the cell holds the informed state.
    #[must_use]
    pub const fn is_informed(self) -> bool {
        matches!(self, Self::Informed)
    }

    /// Returns the next state in the manual editing cycle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Uninformed => Self::Informed,
            Self::Informed => Self::Uninformed,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are always normalized into the grid they were produced for;
/// use [`GridSize::wrap`] to turn arbitrary signed coordinates into one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Fixed dimensions of the toroidal population grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Normalizes arbitrary signed coordinates onto the torus.
    ///
    /// Values outside the grid wrap modulo the dimension, with negative values
    /// wrapping to the upper end. An empty dimension collapses to zero.
    #[must_use]
    pub fn wrap(&self, x: i64, y: i64) -> CellCoord {
        CellCoord::new(wrap_axis(x, self.width), wrap_axis(y, self.height))
    }

    /// Row-major buffer index of a normalized cell.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> usize {
        cell.row() as usize * self.width as usize + cell.column() as usize
    }

    /// Cell located at the provided row-major buffer index.
    #[must_use]
    pub fn coord(&self, index: usize) -> CellCoord {
        let width = (self.width as usize).max(1);
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }

    /// Rounds both dimensions down to a multiple of the block size.
    ///
    /// Dimensions smaller than a single block are kept as a single block so
    /// the grid never collapses to zero. A zero block size leaves the size
    /// untouched.
    #[must_use]
    pub fn aligned_to(self, block: u32) -> Self {
        if block == 0 {
            return self;
        }
        let align = |extent: u32| (extent - extent % block).max(block);
        Self::new(align(self.width), align(self.height))
    }
}

fn wrap_axis(value: i64, extent: u32) -> u32 {
    if extent == 0 {
        return 0;
    }
    value.rem_euclid(i64::from(extent)) as u32
}

/// Immutable copy of the full grid at one discrete time step.
///
/// Snapshots share their backing buffer, so cloning one is cheap and no
/// handle can ever observe a later mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridSnapshot {
    size: GridSize,
    cells: Arc<[CellState]>,
}

impl GridSnapshot {
    /// Captures a snapshot from a row-major cell buffer.
    ///
    /// Buffers shorter than the grid are padded with uninformed cells and
    /// longer buffers are truncated.
    #[must_use]
    pub fn from_cells(size: GridSize, mut cells: Vec<CellState>) -> Self {
        cells.resize(size.cell_count(), CellState::Uninformed);
        Self {
            size,
            cells: cells.into(),
        }
    }

    /// Dimensions of the captured grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// State of the cell at the provided coordinates, wrapping toroidally.
    #[must_use]
    pub fn state(&self, x: i64, y: i64) -> CellState {
        self.state_at(self.size.wrap(x, y))
    }

    /// State of a normalized cell.
    #[must_use]
    pub fn state_at(&self, cell: CellCoord) -> CellState {
        self.cells
            .get(self.size.index(cell))
            .copied()
            .unwrap_or_default()
    }

    /// Row-major view of every cell state.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Number of informed cells in the snapshot.
    #[must_use]
    pub fn informed_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_informed()).count()
    }

    /// Reports whether no cell remains uninformed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cells.iter().all(|state| state.is_informed())
    }
}

/// Clamped tuning values that drive a single diffusion query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParameters {
    network_size: u32,
    network_effect: f64,
    weak_effect: f64,
    advertising_effect: f64,
    weak_count: u32,
}

impl DiffusionParameters {
    /// Creates a parameter set, clamping every effect into `[0, 1]`.
    ///
    /// Non-finite effects collapse to zero, except positive infinity which
    /// clamps to one.
    #[must_use]
    pub fn new(
        network_size: u32,
        network_effect: f64,
        weak_effect: f64,
        advertising_effect: f64,
        weak_count: u32,
    ) -> Self {
        Self {
            network_size,
            network_effect: clamp_effect(network_effect),
            weak_effect: clamp_effect(weak_effect),
            advertising_effect: clamp_effect(advertising_effect),
            weak_count,
        }
    }

    /// Side length of the square blocks that form local networks.
    #[must_use]
    pub const fn network_size(&self) -> u32 {
        self.network_size
    }

    /// Adoption pressure contributed by each informed network neighbour.
    #[must_use]
    pub const fn network_effect(&self) -> f64 {
        self.network_effect
    }

    /// Adoption pressure contributed by each informed weak tie.
    #[must_use]
    pub const fn weak_effect(&self) -> f64 {
        self.weak_effect
    }

    /// Constant adoption pressure applied to every uninformed cell.
    #[must_use]
    pub const fn advertising_effect(&self) -> f64 {
        self.advertising_effect
    }

    /// Requested weak-tie sample size.
    #[must_use]
    pub const fn weak_count(&self) -> u32 {
        self.weak_count
    }
}

impl Default for DiffusionParameters {
    fn default() -> Self {
        Self::new(DEFAULT_NETWORK_SIZE, 0.1, 0.05, 0.001, 5)
    }
}

fn clamp_effect(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Raw, unvalidated text inputs as typed into a parameter form.
///
/// Resolution is forgiving: anything that does not start with a number reads
/// as `0`, trailing garbage after a numeric prefix is ignored, and values are
/// clamped into their legal ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterInputs {
    /// Text of the block size field.
    pub network_size: String,
    /// Text of the network effect field.
    pub network_effect: String,
    /// Text of the weak-tie effect field.
    pub weak_effect: String,
    /// Text of the advertising effect field.
    pub advertising_effect: String,
    /// Text of the weak-tie sample size field.
    pub weak_count: String,
}

impl ParameterInputs {
    /// Parses and clamps the raw inputs into a usable parameter set.
    #[must_use]
    pub fn resolve(&self) -> DiffusionParameters {
        DiffusionParameters::new(
            parse_count(&self.network_size),
            parse_effect(&self.network_effect),
            parse_effect(&self.weak_effect),
            parse_effect(&self.advertising_effect),
            parse_count(&self.weak_count),
        )
    }
}

fn parse_effect(text: &str) -> f64 {
    let text = text.trim_start();
    let value = text
        .char_indices()
        .map(|(index, character)| index + character.len_utf8())
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .unwrap_or(0.0);
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn parse_count(text: &str) -> u32 {
    let text = text.trim_start();
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    if unsigned.starts_with('-') {
        return 0;
    }
    let digits: String = unsigned
        .chars()
        .take_while(|character| character.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Supplier of diffusion parameters, consulted afresh on every query.
///
/// Implementations must not cache: callers rely on observing changes made
/// between generations.
pub trait ParameterSource {
    /// Reads the current parameter set.
    fn parameters(&self) -> DiffusionParameters;
}

impl ParameterSource for DiffusionParameters {
    fn parameters(&self) -> DiffusionParameters {
        *self
    }
}

impl ParameterSource for ParameterInputs {
    fn parameters(&self) -> DiffusionParameters {
        self.resolve()
    }
}

impl<P: ParameterSource + ?Sized> ParameterSource for RefCell<P> {
    fn parameters(&self) -> DiffusionParameters {
        self.borrow().parameters()
    }
}

impl<P: ParameterSource + ?Sized> ParameterSource for Rc<P> {
    fn parameters(&self) -> DiffusionParameters {
        (**self).parameters()
    }
}

/// Run state of the generation scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// No advances are scheduled; the grid may be edited and scrubbed.
    #[default]
    Stopped,
    /// Generations advance at the scheduler's cadence.
    Running,
}

/// Reasons a manual cell edit may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditLock {
    /// The scheduler is running, so the grid belongs to the transition engine.
    Running,
    /// The view is scrubbed to a past generation.
    Scrubbing,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the cooperative clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a transition between the stopped and running states.
    SetRunState {
        /// State the world should adopt.
        state: RunState,
    },
    /// Requests a single synchronous generation advance.
    AdvanceGeneration,
    /// Requests a manual edit of one cell in the live grid.
    SetCellState {
        /// Cell to edit.
        cell: CellCoord,
        /// State to assign.
        state: CellState,
    },
    /// Requests that one cell cycle to its next manual state.
    ToggleCell {
        /// Cell to edit.
        cell: CellCoord,
    },
    /// Moves the view cursor to a past generation.
    ScrubTo {
        /// Requested time index; clamped to the last generation.
        time: usize,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the cooperative clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world entered a new run state.
    RunStateChanged {
        /// State that became active.
        state: RunState,
    },
    /// Reports a committed change to one live cell.
    CellStateChanged {
        /// Cell whose state changed.
        cell: CellCoord,
        /// State the cell now holds.
        state: CellState,
    },
    /// Confirms that a new generation was appended to the history.
    GenerationCommitted {
        /// Time index assigned to the generation.
        time: usize,
        /// Number of informed cells in the generation.
        informed: usize,
    },
    /// Reports that the view cursor moved to a recorded generation.
    GenerationViewed {
        /// Time index now being viewed.
        time: usize,
    },
    /// Reports that an advance found no uninformed cell left.
    SimulationFinished {
        /// Time index of the final generation.
        time: usize,
    },
    /// Reports that a manual edit was ignored.
    EditRejected {
        /// Cell targeted by the edit.
        cell: CellCoord,
        /// Why the edit was refused.
        reason: EditLock,
    },
}
