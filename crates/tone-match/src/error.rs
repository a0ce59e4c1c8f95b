use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("trigger pattern '{0}' failed to compile as regex: {1}")]
    BadPattern(String, regex::Error),

    #[error("aho-corasick automaton build failed: {0}")]
    AutomatonBuild(#[from] aho_corasick::BuildError),
}
