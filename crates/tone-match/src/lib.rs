//! C2 TokenScanner: Aho-Corasick + unigram map + regex hybrid tone-trigger
//! scanning (spec §4.2).

pub mod error;
pub mod hit;
pub mod scanner;

pub use error::MatchError;
pub use hit::{dedupe, TriggerHit};
pub use scanner::{ScanMode, TokenScanner};
