//! NLP-layer error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("input text exceeded the maximum analyzable length ({0} chars)")]
    InputTooLong(usize),

    #[error("pattern '{0}' in '{1}' failed to compile: {2}")]
    BadPattern(String, &'static str, regex::Error),
}
