//! Shared types for the tone and therapy-advice analytics core.
//!
//! This crate provides the wire/runtime types shared across every other
//! crate in the workspace:
//! - UI tone buckets and their distribution (`bucket`)
//! - The normalized linguistic analysis object, `CompactDoc` (`doc`)
//! - The rule-scorer output, `ToneScore` (`tone`)
//! - The therapy-advice corpus item type, `AdviceItem` (`advice`)
//! - The externally-maintained attachment estimate (`attachment`)
//! - Per-field streaming state and conversation memory (`stream`)

pub mod advice;
pub mod attachment;
pub mod bucket;
pub mod doc;
pub mod stream;

pub use advice::{AdviceItem, Suggestion, SuggestionType};
pub use attachment::{AttachmentEstimate, AttachmentScores, AttachmentStyle};
pub use bucket::{Bucket, BucketDist, NORMALIZE_EPS};
pub use doc::{
    CompactDoc, ContextResult, Dep, Entity, PhraseEdge, Pos, Sarcasm, Span, Token, TokenSpan,
    COMPACT_DOC_VERSION,
};
pub use stream::{ConversationMemory, StreamState, CONVERSATION_MEMORY_TTL_MS};
