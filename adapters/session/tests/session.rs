use std::{cell::RefCell, rc::Rc, time::Duration};

use rumor_mill_core::{
    CellCoord, CellState, DiffusionParameters, GridSize, GridSnapshot, ParameterInputs, RunState,
};
use rumor_mill_session::{NullSink, RenderSink, Session, SessionConfig};

const INTERVAL: Duration = Duration::from_millis(750);

#[derive(Debug, Default)]
struct RecordingSink {
    changes: Vec<(CellCoord, CellState)>,
    viewed: Vec<(usize, usize)>,
    run_states: Vec<RunState>,
}

impl RenderSink for RecordingSink {
    fn cell_changed(&mut self, cell: CellCoord, state: CellState) {
        self.changes.push((cell, state));
    }

    fn generation_viewed(&mut self, time: usize, snapshot: &GridSnapshot) {
        self.viewed.push((time, snapshot.informed_count()));
    }

    fn run_state_changed(&mut self, state: RunState) {
        self.run_states.push(state);
    }
}

fn session(parameters: DiffusionParameters) -> Session<RecordingSink> {
    Session::initialize(
        SessionConfig::new(GridSize::new(4, 4), INTERVAL, 1234),
        |_| CellState::Uninformed,
        Box::new(parameters),
        RecordingSink::default(),
    )
    .expect("grid dimensions are non-zero")
}

#[test]
fn advertising_scenario_runs_to_completion() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 1.0, 0));

    session.start();
    assert_eq!(session.max_time_index(), 1);
    assert_eq!(session.sink().changes.len(), 16);
    assert!(session.is_finished());
    assert!(session.is_running());

    session.tick(INTERVAL);
    assert!(!session.is_running());
    assert_eq!(session.max_time_index(), 1);
    assert_eq!(
        session.sink().run_states,
        vec![RunState::Running, RunState::Stopped]
    );
}

#[test]
fn ticks_shorter_than_the_interval_do_not_advance() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    session.start();
    session.tick(Duration::from_millis(300));
    session.tick(Duration::from_millis(300));
    assert_eq!(session.max_time_index(), 1);
    assert_eq!(session.time_until_step(), Some(Duration::from_millis(150)));

    session.tick(Duration::from_millis(150));
    assert_eq!(session.max_time_index(), 2);
}

#[test]
fn stop_prevents_any_further_generation() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    session.start();
    session.stop();
    for _ in 0..5 {
        session.tick(INTERVAL);
    }

    assert_eq!(session.max_time_index(), 1);
    assert_eq!(session.time_until_step(), None);
}

#[test]
fn editing_is_gated_by_run_state_and_scrub_position() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    assert!(session.can_edit());
    assert!(session.set_state(1, 1, CellState::Informed));
    assert_eq!(session.max_time_index(), 1);
    assert_eq!(
        session.sink().changes,
        vec![(CellCoord::new(1, 1), CellState::Informed)]
    );

    session.start();
    assert!(!session.can_edit());
    assert!(!session.toggle_state(0, 0));

    session.tick(INTERVAL);
    let latest = session.max_time_index();
    let snapshot = session.scrub_to(0).clone();
    assert_eq!(snapshot.informed_count(), 0);
    assert!(!session.is_running());
    assert_eq!(session.current_time_index(), 0);
    assert!(!session.can_edit());
    assert!(!session.toggle_state(2, 2));
    assert_eq!(session.state(1, 1), CellState::Informed, "live grid untouched");

    let _ = session.scrub_to(latest);
    assert!(session.can_edit());
    assert!(session.toggle_state(-1, -1));
    assert_eq!(session.state(3, 3), CellState::Informed);
}

#[test]
fn scrubbing_notifies_the_sink_with_the_recorded_snapshot() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    assert!(session.toggle_state(0, 0));
    assert!(session.toggle_state(1, 0));

    let _ = session.scrub_to(1);
    let _ = session.scrub_to(usize::MAX);
    assert_eq!(session.sink().viewed, vec![(1, 1), (2, 2)]);
}

#[test]
fn starting_after_a_scrub_resumes_from_the_latest_generation() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    assert!(session.toggle_state(0, 0));
    let _ = session.scrub_to(0);

    session.toggle_running();
    assert!(session.is_running());
    assert_eq!(session.current_time_index(), session.max_time_index());
    assert_eq!(session.viewed_snapshot().informed_count(), 1);

    session.toggle_running();
    assert!(!session.is_running());
}

#[test]
fn raw_parameter_inputs_are_read_on_every_generation() {
    let inputs = Rc::new(RefCell::new(ParameterInputs {
        network_size: "2".to_owned(),
        network_effect: "".to_owned(),
        weak_effect: "n/a".to_owned(),
        advertising_effect: "0".to_owned(),
        weak_count: "1".to_owned(),
    }));
    let mut session = Session::initialize(
        SessionConfig::new(GridSize::new(4, 4), INTERVAL, 5),
        |_| CellState::Uninformed,
        Box::new(Rc::clone(&inputs)),
        NullSink,
    )
    .expect("grid dimensions are non-zero");

    session.start();
    assert_eq!(session.history().latest().informed_count(), 0);

    inputs.borrow_mut().advertising_effect = "2.5".to_owned();
    session.tick(INTERVAL);
    assert!(session.is_finished());
}

#[test]
fn dispose_returns_the_full_history() {
    let mut session = session(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    session.start();
    session.tick(INTERVAL);
    session.tick(INTERVAL);

    let history = session.dispose();
    assert_eq!(history.len(), 4);
    assert_eq!(history.adoption_curve(), vec![0, 0, 0, 0]);
}
