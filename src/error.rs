//! Crate error type

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or hosting the effects.
///
/// Per-frame work (physics, sequencing, shape sampling) never fails; only
/// construction, configuration and the I/O edges return these.
#[derive(Debug, Error)]
pub enum FxError {
    /// No stage layer is registered under the selector
    #[error("no canvas matches selector '{0}'")]
    CanvasNotFound(String),

    /// An option value is outside its accepted range
    #[error("invalid option `{key}`: {reason}")]
    InvalidOption { key: &'static str, reason: String },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// SDL reports its failures as plain strings
    #[error("display: {0}")]
    Display(String),

    #[error("control socket: {0}")]
    Control(#[from] std::io::Error),

    #[error("mqtt: {0}")]
    Mqtt(String),
}

impl FxError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            key,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = FxError::CanvasNotFound("#nope".to_string());
        assert_eq!(err.to_string(), "no canvas matches selector '#nope'");

        let err = FxError::invalid("gap", "must be greater than zero");
        assert_eq!(err.to_string(), "invalid option `gap`: must be greater than zero");
    }
}
