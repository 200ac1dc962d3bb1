//! Error types
//!
//! The simulation itself never fails: life loss and game over are outcomes,
//! not faults. Errors only come from loading configuration and from bringing
//! up the host's collaborators.

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Crate-level errors surfaced to the host
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The rendering collaborator could not be constructed
    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_names_field() {
        let err = ConfigError::invalid("player.friction", "must be in [0, 1)");
        assert_eq!(
            err.to_string(),
            "Invalid value for `player.friction`: must be in [0, 1)"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::invalid("starting_lives", "must be at least 1").into();
        assert!(matches!(err, Error::Config(ConfigError::Invalid { .. })));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
