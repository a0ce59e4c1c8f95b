//! Orchestrator-level error type (spec §7): only configuration-completeness
//! failures and missing required inputs are surfaced to the caller. Every
//! per-stage recoverable failure (pattern-compile, NLI, local-analysis) is
//! handled inside its own crate and never reaches here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("critical JSON dependencies missing or malformed: {0}")]
    CriticalConfigMissing(#[from] tone_config::ConfigError),

    #[error("therapy advice corpus is empty, cannot build the advice index")]
    EmptyAdviceCorpus,

    #[error("fullToneAnalysis is required for generateAdvancedSuggestions but was not provided")]
    MissingToneAnalysis,

    #[error("unknown attachment style '{0}'")]
    UnknownAttachmentStyle(String),
}
