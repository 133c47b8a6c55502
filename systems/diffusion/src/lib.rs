#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Synchronous diffusion step that turns one generation into the next.
//!
//! The engine reads exclusively from a fixed reference snapshot, so the
//! outcome of every cell is independent of the order in which cells are
//! visited. Randomness is injected as a per-generation seed: each cell draws
//! from its own ChaCha stream keyed by its buffer index, which keeps a whole
//! generation reproducible from a single `u64`.

pub mod model;
pub mod neighbourhood;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rumor_mill_core::{CellCoord, CellState, GridSnapshot, ParameterSource};

use crate::{
    model::adoption_probability,
    neighbourhood::{count_informed, network_neighbours, weak_ties},
};

/// Outcome of asking the engine to advance a generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The reference snapshot had no uninformed cell left; nothing was produced.
    Finished,
    /// A new generation was computed.
    Advanced(Advance),
}

/// Freshly computed generation along with the cells that changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advance {
    next: GridSnapshot,
    newly_informed: Vec<CellCoord>,
}

impl Advance {
    /// Snapshot of the next generation.
    #[must_use]
    pub fn next(&self) -> &GridSnapshot {
        &self.next
    }

    /// Cells that switched to informed, in row-major order.
    #[must_use]
    pub fn newly_informed(&self) -> &[CellCoord] {
        &self.newly_informed
    }

    /// Consumes the advance, yielding the snapshot and the changed cells.
    #[must_use]
    pub fn into_parts(self) -> (GridSnapshot, Vec<CellCoord>) {
        (self.next, self.newly_informed)
    }
}

/// Stateless engine that evaluates the per-cell transition rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionEngine;

impl TransitionEngine {
    /// Computes the generation following `reference`.
    ///
    /// Parameters are pulled from `source` for every neighbourhood query, so a
    /// source that changes mid-generation is observed immediately.
    #[must_use]
    pub fn advance(
        &self,
        reference: &GridSnapshot,
        source: &dyn ParameterSource,
        generation_seed: u64,
    ) -> Transition {
        if reference.is_finished() {
            return Transition::Finished;
        }

        let size = reference.size();
        let mut cells = reference.cells().to_vec();
        let mut newly_informed = Vec::new();
        for cell in size.cells() {
            let next = self.evaluate_cell(reference, cell, source, generation_seed);
            if next != reference.state_at(cell) {
                cells[size.index(cell)] = next;
                newly_informed.push(cell);
            }
        }

        Transition::Advanced(Advance {
            next: GridSnapshot::from_cells(size, cells),
            newly_informed,
        })
    }

    /// Decides the next state of a single cell against the reference snapshot.
    ///
    /// Informed cells stay informed. An uninformed cell counts informed
    /// network neighbours and informed weak ties, then adopts when a uniform
    /// draw in `[0, 1)` falls below the adoption probability.
    #[must_use]
    pub fn evaluate_cell(
        &self,
        reference: &GridSnapshot,
        cell: CellCoord,
        source: &dyn ParameterSource,
        generation_seed: u64,
    ) -> CellState {
        let current = reference.state_at(cell);
        if current.is_informed() {
            return current;
        }

        let mut rng = cell_rng(generation_seed, reference.size().index(cell));

        let network_size = source.parameters().network_size();
        let network_informed = count_informed(&network_neighbours(reference, cell, network_size));

        let parameters = source.parameters();
        let weak_informed = count_informed(&weak_ties(
            reference,
            cell,
            parameters.network_size(),
            parameters.weak_count(),
            &mut rng,
        ));

        let probability = adoption_probability(weak_informed, network_informed, &parameters);
        if rng.gen::<f64>() < probability {
            CellState::Informed
        } else {
            current
        }
    }
}

fn cell_rng(generation_seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(generation_seed);
    rng.set_stream(index as u64);
    rng
}
