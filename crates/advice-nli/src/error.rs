use thiserror::Error;

#[derive(Debug, Error)]
pub enum NliError {
    #[error("nli scoring timed out after {0}ms")]
    Timeout(u64),
    #[error("nli backing model is unavailable")]
    ModelUnavailable,
    #[error("nli tokenization failed: {0}")]
    Tokenize(String),
    #[error("nli inference failed: {0}")]
    Inference(String),
}
