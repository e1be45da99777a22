//! Configuration types deserialized from `trellis.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `trellis.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Settings for net resolution and scheduling.
    #[serde(default)]
    pub elaborate: ElaborateConfig,
    /// Settings for the simulation kernel.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Core project metadata required in every `trellis.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Elaboration settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ElaborateConfig {
    /// Tolerate reads of bits that nothing drives.
    ///
    /// When set, undriven reads are logged as warnings and read as zero
    /// instead of failing elaboration.
    #[serde(default)]
    pub allow_floating_nets: bool,
}

/// Simulation kernel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Number of ticks the reset signal is held high by `sim_reset`.
    #[serde(default = "default_reset_cycles")]
    pub reset_cycles: u32,
    /// Upper bound on ticks taken by `run_until`. `None` means unbounded.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_reset_cycles() -> u32 {
    2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            reset_cycles: default_reset_cycles(),
            max_ticks: None,
        }
    }
}

impl ProjectConfig {
    /// Creates a configuration with the given project name and default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            project: ProjectMeta {
                name: name.into(),
                description: String::new(),
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_defaults() {
        let sim = SimulationConfig::default();
        assert_eq!(sim.reset_cycles, 2);
        assert_eq!(sim.max_ticks, None);
    }

    #[test]
    fn named_uses_defaults() {
        let cfg = ProjectConfig::named("queue");
        assert_eq!(cfg.project.name, "queue");
        assert!(!cfg.elaborate.allow_floating_nets);
        assert_eq!(cfg.simulation, SimulationConfig::default());
    }
}
