//! Config-layer error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config blob '{0}' failed to parse: {1}")]
    Malformed(String, serde_json::Error),

    #[error("config directory '{0}' could not be read: {1}")]
    DirUnreadable(String, std::io::Error),

    #[error("critical config blob '{0}' is missing")]
    CriticalMissing(String),
}
