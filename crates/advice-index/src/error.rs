use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("advice corpus is empty, index has nothing to search")]
    EmptyCorpus,
    #[error("unknown advice item id: {0}")]
    UnknownItemId(String),
}
