//! Network and weak-tie neighbourhood sampling against a reference snapshot.

use std::{collections::HashSet, ops::Range};

use rand::Rng;
use rumor_mill_core::{CellCoord, CellState, GridSize, GridSnapshot};

/// Square region of cells that forms one local network.
///
/// Blocks are aligned to multiples of the network size. A trailing block
/// that would extend past the grid edge is clamped to the grid bounds, and a
/// zero network size yields an empty block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    columns: Range<u32>,
    rows: Range<u32>,
}

impl Block {
    /// Locates the block containing the provided cell.
    #[must_use]
    pub fn containing(cell: CellCoord, network_size: u32, size: GridSize) -> Self {
        if network_size == 0 {
            return Self {
                columns: 0..0,
                rows: 0..0,
            };
        }

        Self {
            columns: aligned_span(cell.column(), network_size, size.width()),
            rows: aligned_span(cell.row(), network_size, size.height()),
        }
    }

    /// Reports whether an un-wrapped coordinate falls inside the block.
    #[must_use]
    pub fn contains(&self, column: u32, row: u32) -> bool {
        self.columns.contains(&column) && self.rows.contains(&row)
    }

    /// Number of cells covered by the block.
    #[must_use]
    pub fn len(&self) -> u64 {
        span_len(&self.columns) * span_len(&self.rows)
    }

    /// Reports whether the block covers no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the block's cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.rows
            .clone()
            .flat_map(move |row| self.columns.clone().map(move |column| CellCoord::new(column, row)))
    }
}

fn aligned_span(position: u32, network_size: u32, extent: u32) -> Range<u32> {
    let start = position - position % network_size;
    let end = start.saturating_add(network_size).min(extent);
    start..end
}

fn span_len(span: &Range<u32>) -> u64 {
    u64::from(span.end.saturating_sub(span.start))
}

/// States of every other cell sharing the provided cell's block.
#[must_use]
pub fn network_neighbours(
    reference: &GridSnapshot,
    cell: CellCoord,
    network_size: u32,
) -> Vec<CellState> {
    Block::containing(cell, network_size, reference.size())
        .cells()
        .filter(|neighbour| *neighbour != cell)
        .map(|neighbour| reference.state_at(neighbour))
        .collect()
}

/// States of a random sample of cells outside the provided cell's block.
///
/// Coordinates are drawn uniformly from `[0, width] × [0, height]`; the
/// upper bounds are inclusive and read back through toroidal wrapping, so
/// the last column and row alias the first. Draws that repeat an earlier
/// coordinate or land inside the cell's block are rejected until
/// `weak_count + 1` distinct coordinates are collected. When fewer distinct
/// candidates exist, every candidate is taken once.
pub fn weak_ties<R>(
    reference: &GridSnapshot,
    cell: CellCoord,
    network_size: u32,
    weak_count: u32,
    rng: &mut R,
) -> Vec<CellState>
where
    R: Rng + ?Sized,
{
    let size = reference.size();
    let block = Block::containing(cell, network_size, size);

    let candidates =
        (u64::from(size.width()) + 1) * (u64::from(size.height()) + 1) - block.len();
    let requested = u64::from(weak_count) + 1;
    let target = requested.min(candidates);
    if target < requested {
        tracing::trace!(
            requested,
            candidates,
            column = cell.column(),
            row = cell.row(),
            "weak-tie sample capped to available candidates"
        );
    }

    let target = usize::try_from(target).unwrap_or(usize::MAX);
    let mut chosen: HashSet<(u32, u32)> = HashSet::with_capacity(target);
    let mut states = Vec::with_capacity(target);
    while states.len() < target {
        let column = rng.gen_range(0..=size.width());
        let row = rng.gen_range(0..=size.height());
        if block.contains(column, row) || !chosen.insert((column, row)) {
            continue;
        }
        states.push(reference.state(i64::from(column), i64::from(row)));
    }

    states
}

/// Number of informed entries in a neighbourhood sample.
#[must_use]
pub fn count_informed(states: &[CellState]) -> u32 {
    let informed = states.iter().filter(|state| state.is_informed()).count();
    u32::try_from(informed).unwrap_or(u32::MAX)
}
