//! Append-only generation history used for playback.

use rumor_mill_core::GridSnapshot;

/// Ordered record of every committed generation.
///
/// Index 0 holds the initial grid and the last index always mirrors the live
/// grid. Entries are immutable snapshots, so nothing recorded can change
/// after it is appended.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<GridSnapshot>,
}

impl History {
    /// Starts a history whose generation 0 is `initial`.
    pub(crate) fn new(initial: GridSnapshot) -> Self {
        Self {
            snapshots: vec![initial],
        }
    }

    /// Appends a generation and returns its time index.
    pub(crate) fn append(&mut self, snapshot: GridSnapshot) -> usize {
        self.snapshots.push(snapshot);
        self.last_index()
    }

    /// Snapshot recorded at `index`, clamped to the last generation.
    #[must_use]
    pub fn restore(&self, index: usize) -> &GridSnapshot {
        &self.snapshots[self.clamp(index)]
    }

    /// Clamps a requested time index into the recorded range.
    #[must_use]
    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Most recently appended generation.
    #[must_use]
    pub fn latest(&self) -> &GridSnapshot {
        self.restore(self.last_index())
    }

    /// Time index of the most recently appended generation.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    /// Number of recorded generations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: a history starts with its initial generation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Iterates the generations in time order.
    pub fn iter(&self) -> impl Iterator<Item = &GridSnapshot> {
        self.snapshots.iter()
    }

    /// Informed cell count of every generation in time order.
    #[must_use]
    pub fn adoption_curve(&self) -> Vec<usize> {
        self.snapshots
            .iter()
            .map(GridSnapshot::informed_count)
            .collect()
    }
}
