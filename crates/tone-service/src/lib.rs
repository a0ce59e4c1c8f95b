//! C13 SuggestionsService: the top-level orchestrator composing the tone
//! pipeline (C3-C8), the advice retrieval/ranking pipeline (C9-C12), and
//! the incremental stream controller (C9 ToneStream) into the three
//! externally visible entry points — `analyzeTone`, `generateAdvanced
//! Suggestions`, and `toneLive` (spec §4.13, §6).

mod analysis;
mod cache;
mod error;
mod response;
mod service;
mod stream_engine;
mod suggestions;

pub use error::ServiceError;
pub use response::{AttachmentInsights, ContextAnalysis, Emotions, LinguisticFeatures, RelationshipImpact, ToneLabel, ToneResponse};
pub use service::{AnalyzeOptions, SuggestionAnalysis, SuggestionOptions, SuggestionsService, UserProfile};
