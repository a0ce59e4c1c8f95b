use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("weight lookup for '{0}' fell through every fallback tier")]
    WeightFallthrough(String),
}
