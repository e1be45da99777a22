//! Parsing and validation of `trellis.toml` project configuration files.
//!
//! A configuration carries the project name plus the knobs that control
//! elaboration (whether undriven reads are tolerated) and simulation (reset
//! length and the tick budget for `run_until`).

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
