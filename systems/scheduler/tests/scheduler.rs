use std::time::Duration;

use rumor_mill_core::{CellState, Command, DiffusionParameters, Event, GridSize, RunState};
use rumor_mill_system_scheduler::{Config, Scheduler};
use rumor_mill_world::{self as world, query, World};

const INTERVAL: Duration = Duration::from_millis(750);

fn world_with(parameters: DiffusionParameters) -> World {
    World::initialize(
        GridSize::new(4, 4),
        |_| CellState::Uninformed,
        Box::new(parameters),
        21,
    )
    .expect("grid dimensions are non-zero")
}

fn process(world: &mut World, scheduler: &mut Scheduler, command: Command) -> Vec<Event> {
    let mut log = Vec::new();
    let mut commands = vec![command];

    while !commands.is_empty() {
        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        scheduler.handle(&events, &mut commands);
        log.extend(events);
    }

    log
}

fn committed(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::GenerationCommitted { .. }))
        .count()
}

#[test]
fn starting_advances_immediately_then_waits_for_the_interval() {
    let mut world = world_with(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    let mut scheduler = Scheduler::new(Config::new(INTERVAL));

    let events = process(
        &mut world,
        &mut scheduler,
        Command::SetRunState {
            state: RunState::Running,
        },
    );
    assert_eq!(committed(&events), 1);
    assert!(scheduler.is_armed());

    let events = process(
        &mut world,
        &mut scheduler,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
    );
    assert_eq!(committed(&events), 0);
    assert_eq!(
        scheduler.time_until_step(),
        Some(Duration::from_millis(250))
    );

    let events = process(
        &mut world,
        &mut scheduler,
        Command::Tick {
            dt: Duration::from_millis(250),
        },
    );
    assert_eq!(committed(&events), 1);
    assert_eq!(query::max_time_index(&world), 2);
}

#[test]
fn long_ticks_fire_at_most_one_step() {
    let mut world = world_with(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    let mut scheduler = Scheduler::new(Config::new(INTERVAL));
    let _ = process(
        &mut world,
        &mut scheduler,
        Command::SetRunState {
            state: RunState::Running,
        },
    );

    let events = process(
        &mut world,
        &mut scheduler,
        Command::Tick {
            dt: INTERVAL * 10,
        },
    );
    assert_eq!(committed(&events), 1);
}

#[test]
fn stopping_cancels_the_pending_step() {
    let mut world = world_with(DiffusionParameters::new(2, 0.0, 0.0, 0.0, 0));
    let mut scheduler = Scheduler::new(Config::new(INTERVAL));
    let _ = process(
        &mut world,
        &mut scheduler,
        Command::SetRunState {
            state: RunState::Running,
        },
    );
    let _ = process(
        &mut world,
        &mut scheduler,
        Command::SetRunState {
            state: RunState::Stopped,
        },
    );
    assert!(!scheduler.is_armed());

    let events = process(&mut world, &mut scheduler, Command::Tick { dt: INTERVAL });
    assert_eq!(committed(&events), 0);
    assert_eq!(query::max_time_index(&world), 1);
}

#[test]
fn finished_grid_stops_the_scheduler() {
    let mut world = world_with(DiffusionParameters::new(2, 0.0, 0.0, 1.0, 0));
    let mut scheduler = Scheduler::new(Config::new(INTERVAL));
    let _ = process(
        &mut world,
        &mut scheduler,
        Command::SetRunState {
            state: RunState::Running,
        },
    );
    assert!(query::is_finished(&world));

    let events = process(&mut world, &mut scheduler, Command::Tick { dt: INTERVAL });
    assert!(events.contains(&Event::SimulationFinished { time: 1 }));
    assert!(!query::is_running(&world));
    assert!(!scheduler.is_armed());
}

#[test]
fn manual_edits_while_stopped_do_not_arm_steps() {
    let mut scheduler = Scheduler::new(Config::new(INTERVAL));
    let mut commands = Vec::new();
    scheduler.handle(
        &[Event::GenerationCommitted {
            time: 1,
            informed: 1,
        }],
        &mut commands,
    );

    assert!(commands.is_empty());
    assert!(!scheduler.is_armed());
}
