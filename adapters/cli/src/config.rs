//! TOML configuration for the command-line shell.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use rumor_mill_core::{
    CellCoord, DiffusionParameters, GridSize, DEFAULT_NETWORK_SIZE, DEFAULT_STEP_INTERVAL,
};
use serde::Deserialize;

/// Complete configuration of a headless run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Seed of the simulation's random stream.
    pub(crate) seed: u64,
    /// Grid dimensions and initially informed cells.
    pub(crate) grid: GridConfig,
    /// Diffusion tuning values.
    pub(crate) parameters: ParameterConfig,
    /// Pacing of generation advances.
    pub(crate) schedule: ScheduleConfig,
}

impl SimulationConfig {
    /// Loads and parses the configuration file at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml contents")?;
        if config.grid.width == 0 || config.grid.height == 0 {
            bail!(
                "grid dimensions must be non-zero, got {}x{}",
                config.grid.width,
                config.grid.height
            );
        }
        Ok(config)
    }

    /// Grid size rounded down to whole network blocks.
    pub(crate) fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid.width, self.grid.height).aligned_to(self.parameters.network_size)
    }

    /// Clamped diffusion parameters.
    pub(crate) fn diffusion_parameters(&self) -> DiffusionParameters {
        let parameters = &self.parameters;
        DiffusionParameters::new(
            parameters.network_size,
            parameters.network_effect,
            parameters.weak_effect,
            parameters.advertising_effect,
            parameters.weak_count,
        )
    }

    /// Initially informed cells, wrapped onto the aligned grid.
    pub(crate) fn seeded_cells(&self) -> Vec<CellCoord> {
        let size = self.grid_size();
        self.grid
            .informed
            .iter()
            .map(|&[x, y]| size.wrap(x, y))
            .collect()
    }
}

/// Grid section of the configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridConfig {
    /// Requested number of columns before block alignment.
    pub(crate) width: u32,
    /// Requested number of rows before block alignment.
    pub(crate) height: u32,
    /// Cells that start informed, as `[x, y]` pairs.
    pub(crate) informed: Vec<[i64; 2]>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 30,
            informed: Vec::new(),
        }
    }
}

/// Parameter section of the configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ParameterConfig {
    pub(crate) network_size: u32,
    pub(crate) network_effect: f64,
    pub(crate) weak_effect: f64,
    pub(crate) advertising_effect: f64,
    pub(crate) weak_count: u32,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        let defaults = DiffusionParameters::default();
        Self {
            network_size: DEFAULT_NETWORK_SIZE,
            network_effect: defaults.network_effect(),
            weak_effect: defaults.weak_effect(),
            advertising_effect: defaults.advertising_effect(),
            weak_count: defaults.weak_count(),
        }
    }
}

/// Schedule section of the configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScheduleConfig {
    /// Milliseconds between generation advances.
    pub(crate) interval_ms: u64,
    /// Upper bound on generations before the run is stopped.
    pub(crate) max_generations: usize,
}

impl ScheduleConfig {
    pub(crate) fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_STEP_INTERVAL.as_millis() as u64,
            max_generations: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SimulationConfig::parse("").expect("empty config is valid");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.schedule.interval(), Duration::from_millis(750));
        assert_eq!(config.grid_size(), GridSize::new(60, 30));
    }

    #[test]
    fn parses_every_section() {
        let config = SimulationConfig::parse(
            r#"
            seed = 42

            [grid]
            width = 23
            height = 17
            informed = [[0, 0], [-1, 3]]

            [parameters]
            network_size = 4
            network_effect = 0.3
            weak_effect = 1.7
            advertising_effect = 0.0
            weak_count = 2

            [schedule]
            interval_ms = 100
            max_generations = 20
            "#,
        )
        .expect("config is valid");

        assert_eq!(config.seed, 42);
        assert_eq!(config.grid_size(), GridSize::new(20, 16));
        assert_eq!(
            config.seeded_cells(),
            vec![CellCoord::new(0, 0), CellCoord::new(19, 3)]
        );
        assert_eq!(config.diffusion_parameters().weak_effect(), 1.0);
        assert_eq!(config.schedule.max_generations, 20);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(SimulationConfig::parse("[grid]\ndepth = 3\n").is_err());
    }

    #[test]
    fn rejects_empty_grids() {
        let error = SimulationConfig::parse("[grid]\nwidth = 0\n").expect_err("zero width");
        assert!(error.to_string().contains("non-zero"));
    }
}
