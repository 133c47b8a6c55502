use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use rumor_mill_core::{CellCoord, CellState, DiffusionParameters, GridSize};
use rumor_mill_session::{NullSink, Session, SessionConfig};

const INTERVAL: Duration = Duration::from_millis(750);

#[test]
fn deterministic_replay_produces_identical_fingerprints() {
    let first = replay(99);
    let second = replay(99);

    assert_eq!(first.curve, second.curve);
    assert_eq!(
        first.fingerprint(),
        second.fingerprint(),
        "fingerprint mismatch: {:#x}",
        first.fingerprint()
    );
}

#[test]
fn different_seeds_diverge() {
    assert_ne!(replay(1).fingerprint(), replay(2).fingerprint());
}

#[test]
fn replay_respects_diffusion_invariants() {
    let outcome = replay(7);
    assert_eq!(outcome.curve.first(), Some(&2));
    assert!(outcome.curve.windows(2).all(|pair| pair[0] <= pair[1]));
}

fn replay(seed: u64) -> ReplayOutcome {
    let seeded = [CellCoord::new(0, 0), CellCoord::new(11, 7)];
    let mut session = Session::initialize(
        SessionConfig::new(GridSize::new(12, 12), INTERVAL, seed),
        |cell| {
            if seeded.contains(&cell) {
                CellState::Informed
            } else {
                CellState::Uninformed
            }
        },
        Box::new(DiffusionParameters::new(4, 0.3, 0.2, 0.05, 3)),
        NullSink,
    )
    .expect("grid dimensions are non-zero");

    session.start();
    for _ in 0..15 {
        session.tick(INTERVAL);
    }

    let history = session.dispose();
    ReplayOutcome {
        curve: history.adoption_curve(),
        generations: history.iter().cloned().collect(),
    }
}

#[derive(Hash)]
struct ReplayOutcome {
    curve: Vec<usize>,
    generations: Vec<rumor_mill_core::GridSnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
