//! Local heuristic NLP: tokenizer, sentence splitter, POS/lemma tagging,
//! negation-dependency inference, second-person tagging, context
//! classifier, sarcasm/intensity/phrase-edge detection, and the
//! `CompactDoc` projection consumed by every downstream scoring crate
//! (spec §4.3 C3 LocalNLP, §4.4 C4 SpacyBridge, §4.5 C5 FeatureExtractor).
//!
//! There is no actual spaCy process here: `SpacyBridge` in the original
//! design names an optional richer-parser path, and this crate's `pipeline`
//! module *is* that bridge's local-only implementation — see
//! `LocalNlp::analyze` for the full fallback chain.

pub mod context;
pub mod entities;
pub mod error;
pub mod features;
pub mod intensity;
pub mod negation;
pub mod phrase_edges;
pub mod pipeline;
pub mod sarcasm;
pub mod tokenize;

pub use error::NlpError;
pub use features::{extract as extract_features, FeatureSet};
pub use intensity::IntensityHit;
pub use pipeline::LocalNlp;
