//! Internal error type shared by every Trellis crate.

/// A broken invariant inside Trellis itself, never a problem with the design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error during {stage}: {message}")]
pub struct InternalError {
    /// The pipeline stage that detected it, such as `net resolution`.
    pub stage: &'static str,
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error raised by `stage`.
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage() {
        let err = InternalError::new("scheduling", "cell index out of range");
        assert_eq!(
            err.to_string(),
            "internal error during scheduling: cell index out of range"
        );
        assert_eq!(err.stage, "scheduling");
    }
}
