//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "trellis.toml";

/// Loads and validates a `trellis.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `trellis.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key: "project.name",
            reason: "must not be empty".to_string(),
        });
    }
    if config.simulation.max_ticks == Some(0) {
        return Err(ConfigError::Invalid {
            key: "simulation.max_ticks",
            reason: "must be positive; omit it for no limit".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "bypass_queue"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "bypass_queue");
        assert!(!config.elaborate.allow_floating_nets);
        assert_eq!(config.simulation.reset_cycles, 2);
        assert_eq!(config.simulation.max_ticks, None);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "bypass_queue"
description = "single-entry bypass queue"

[elaborate]
allow_floating_nets = true

[simulation]
reset_cycles = 3
max_ticks = 500
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.description, "single-entry bypass queue");
        assert!(config.elaborate.allow_floating_nets);
        assert_eq!(config.simulation.reset_cycles, 3);
        assert_eq!(config.simulation.max_ticks, Some(500));
    }

    #[test]
    fn empty_name_errors() {
        let toml = r#"
[project]
name = "  "
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "project.name",
                ..
            }
        ));
    }

    #[test]
    fn zero_max_ticks_errors() {
        let toml = r#"
[project]
name = "q"

[simulation]
max_ticks = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_project_section_errors() {
        let err = load_config_from_str("[simulation]\nreset_cycles = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[project]\nname = \"regs\"\n\n[simulation]\nreset_cycles = 1\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "regs");
        assert_eq!(config.simulation.reset_cycles, 1);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
