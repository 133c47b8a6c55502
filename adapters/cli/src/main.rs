#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a rumor mill simulation headlessly.

mod config;
mod render;

use std::{
    collections::HashSet,
    io::{self, Write},
    path::PathBuf,
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
use rumor_mill_core::CellState;
use rumor_mill_session::{Session, SessionConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::SimulationConfig, render::TerminalSink};

/// Command-line arguments accepted by the rumor mill binary.
#[derive(Debug, Parser)]
#[command(name = "rumor-mill", about = "Simulate rumor diffusion on a toroidal grid")]
struct Cli {
    /// TOML file providing the simulation configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of grid columns before block alignment.
    #[arg(long)]
    width: Option<u32>,
    /// Number of grid rows before block alignment.
    #[arg(long)]
    height: Option<u32>,
    /// Seed for the simulation's random stream.
    #[arg(long)]
    seed: Option<u64>,
    /// Side length of each personal network block.
    #[arg(long)]
    network_size: Option<u32>,
    /// Adoption pull of informed cells inside the network block.
    #[arg(long)]
    network_effect: Option<f64>,
    /// Adoption pull of informed weak ties.
    #[arg(long)]
    weak_effect: Option<f64>,
    /// Baseline adoption probability independent of neighbours.
    #[arg(long)]
    advertising_effect: Option<f64>,
    /// Number of weak ties sampled per cell.
    #[arg(long)]
    weak_count: Option<u32>,
    /// Milliseconds between generation advances.
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Stop after this many generations even if uninformed cells remain.
    #[arg(long)]
    max_generations: Option<usize>,
    /// Initially informed cell given as `x,y`; may be repeated.
    #[arg(long = "inform", value_name = "X,Y", value_parser = parse_cell)]
    informed: Vec<[i64; 2]>,
    /// Sleep between generations instead of advancing as fast as possible.
    #[arg(long)]
    realtime: bool,
    /// Print every generation as a text frame.
    #[arg(long)]
    frames: bool,
    /// Scrub back to this generation after the run and print it.
    #[arg(long, value_name = "TIME")]
    replay: Option<usize>,
}

impl Cli {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_path(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        override_with(&mut config.grid.width, self.width);
        override_with(&mut config.grid.height, self.height);
        config.grid.informed.extend(self.informed.iter().copied());

        let parameters = &mut config.parameters;
        override_with(&mut parameters.network_size, self.network_size);
        override_with(&mut parameters.network_effect, self.network_effect);
        override_with(&mut parameters.weak_effect, self.weak_effect);
        override_with(&mut parameters.advertising_effect, self.advertising_effect);
        override_with(&mut parameters.weak_count, self.weak_count);

        override_with(&mut config.schedule.interval_ms, self.interval_ms);
        override_with(&mut config.schedule.max_generations, self.max_generations);

        anyhow::ensure!(
            config.grid.width > 0 && config.grid.height > 0,
            "grid dimensions must be non-zero"
        );
        Ok(config)
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_cell(raw: &str) -> Result<[i64; 2], String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|error| format!("invalid coordinate `{value}`: {error}"))
    };
    Ok([parse(x)?, parse(y)?])
}

/// Entry point for the rumor mill command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &config, &mut out)
}

fn run<W: Write>(cli: &Cli, config: &SimulationConfig, out: &mut W) -> Result<()> {
    let size = config.grid_size();
    let seeded: HashSet<_> = config.seeded_cells().into_iter().collect();
    let interval = config.schedule.interval();
    info!(
        width = size.width(),
        height = size.height(),
        seeded = seeded.len(),
        seed = config.seed,
        "initializing simulation"
    );

    let mut session = Session::initialize(
        SessionConfig::new(size, interval, config.seed),
        |cell| {
            if seeded.contains(&cell) {
                CellState::Informed
            } else {
                CellState::Uninformed
            }
        },
        Box::new(config.diffusion_parameters()),
        TerminalSink::default(),
    )
    .context("failed to initialize simulation")?;

    let mut printed = None;
    if cli.frames {
        print_new_generations(out, &session, &mut printed)?;
    }

    session.start();
    loop {
        if cli.frames {
            print_new_generations(out, &session, &mut printed)?;
        }
        if !session.is_running() || session.max_time_index() >= config.schedule.max_generations {
            break;
        }

        let dt = session.time_until_step().unwrap_or(interval);
        if cli.realtime {
            thread::sleep(dt);
        }
        session.tick(dt);
    }

    if session.is_running() {
        warn!(
            max_generations = config.schedule.max_generations,
            informed = session.history().latest().informed_count(),
            "generation limit reached before every cell was informed"
        );
        session.stop();
    }

    info!(
        generations = session.max_time_index(),
        finished = session.is_finished(),
        cell_updates = session.sink().cell_updates(),
        "simulation stopped"
    );

    if let Some(time) = cli.replay {
        let snapshot = session.scrub_to(time).clone();
        writeln!(
            out,
            "== replay of generation {} ==",
            session.current_time_index()
        )?;
        write!(out, "{}", render::frame(&snapshot))?;
    }

    let history = session.dispose();
    write!(
        out,
        "{}",
        render::adoption_table(&history.adoption_curve(), size.cell_count())
    )?;
    out.flush()?;
    Ok(())
}

/// Writes every recorded generation after `printed`, updating the cursor.
fn print_new_generations<W: Write>(
    out: &mut W,
    session: &Session<TerminalSink>,
    printed: &mut Option<usize>,
) -> Result<()> {
    let first = printed.map_or(0, |time| time + 1);
    for time in first..=session.max_time_index() {
        writeln!(out, "== generation {time} ==")?;
        write!(out, "{}", render::frame(session.history().restore(time)))?;
        *printed = Some(time);
    }
    Ok(())
}
