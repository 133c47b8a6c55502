//! Live toroidal cell store.

use rumor_mill_core::{CellCoord, CellState, GridSize, GridSnapshot};

/// Mutable cell array addressed with toroidal wraparound.
///
/// Every coordinate is valid: reads and writes normalize `x` and `y` modulo
/// the grid dimensions, so there is no out-of-bounds path.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Builds a grid by asking `initial` for the state of every cell.
    pub(crate) fn new<F>(size: GridSize, mut initial: F) -> Self
    where
        F: FnMut(CellCoord) -> CellState,
    {
        Self {
            size,
            cells: size.cells().map(|cell| initial(cell)).collect(),
        }
    }

    /// Fixed dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// State of the cell at the provided coordinates.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> CellState {
        let index = self.size.index(self.size.wrap(x, y));
        self.cells.get(index).copied().unwrap_or_default()
    }

    /// Assigns a state and returns the one it replaced.
    pub(crate) fn set(&mut self, x: i64, y: i64, state: CellState) -> CellState {
        let index = self.size.index(self.size.wrap(x, y));
        match self.cells.get_mut(index) {
            Some(slot) => std::mem::replace(slot, state),
            None => CellState::default(),
        }
    }

    /// Reports whether no cell holds the uninformed state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cells.iter().all(|state| state.is_informed())
    }

    /// Number of informed cells.
    #[must_use]
    pub fn informed_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_informed()).count()
    }

    /// Captures an immutable copy of the current cells.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_cells(self.size, self.cells.clone())
    }
}
