//! Plain-text rendering of grid snapshots.

use std::fmt::Write as _;

use rumor_mill_core::{CellCoord, CellState, GridSnapshot, RunState};
use rumor_mill_session::RenderSink;
use tracing::{debug, info};

const INFORMED_GLYPH: char = '#';
const UNINFORMED_GLYPH: char = '.';

/// Draws a snapshot as one text row per grid row.
pub(crate) fn frame(snapshot: &GridSnapshot) -> String {
    let size = snapshot.size();
    let mut out = String::with_capacity(size.cell_count() + size.height() as usize);
    for row in 0..size.height() {
        for column in 0..size.width() {
            out.push(glyph(snapshot.state_at(CellCoord::new(column, row))));
        }
        out.push('\n');
    }
    out
}

/// Formats the informed count of each generation as a two-column table.
pub(crate) fn adoption_table(curve: &[usize], cell_count: usize) -> String {
    let mut out = String::from("generation  informed\n");
    for (time, informed) in curve.iter().enumerate() {
        let share = if cell_count == 0 {
            0.0
        } else {
            *informed as f64 * 100.0 / cell_count as f64
        };
        let _ = writeln!(out, "{time:>10}  {informed:>8} ({share:5.1}%)");
    }
    out
}

fn glyph(state: CellState) -> char {
    match state {
        CellState::Informed => INFORMED_GLYPH,
        CellState::Uninformed => UNINFORMED_GLYPH,
    }
}

/// Sink that tallies cell updates and logs playback changes.
#[derive(Debug, Default)]
pub(crate) struct TerminalSink {
    cell_updates: usize,
}

impl TerminalSink {
    /// Number of cell changes received so far.
    pub(crate) fn cell_updates(&self) -> usize {
        self.cell_updates
    }
}

impl RenderSink for TerminalSink {
    fn cell_changed(&mut self, _cell: CellCoord, _state: CellState) {
        self.cell_updates += 1;
    }

    fn generation_viewed(&mut self, time: usize, snapshot: &GridSnapshot) {
        debug!(time, informed = snapshot.informed_count(), "generation viewed");
    }

    fn run_state_changed(&mut self, state: RunState) {
        info!(?state, "run state changed");
    }
}
