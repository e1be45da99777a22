//! Error types for `trellis.toml` loading and validation.

use std::path::PathBuf;

/// A project configuration that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The TOML content is malformed or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting parsed but is out of range.
    #[error("invalid `{key}`: {reason}")]
    Invalid {
        /// Dotted key of the offending setting, such as `simulation.max_ticks`.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
