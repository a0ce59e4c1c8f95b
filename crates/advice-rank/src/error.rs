use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("guardrail pattern compile failed: {0}")]
    PatternCompile(String),
}
