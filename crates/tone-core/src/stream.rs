//! Per-field streaming state and short-lived conversational memory
//! (spec §3, §4.9).

use crate::bucket::{Bucket, BucketDist};
use std::time::Instant;

/// Conversation-memory TTL (spec §3: "bounded TTL 10 s").
pub const CONVERSATION_MEMORY_TTL_MS: u64 = 10_000;

/// Incremental per-field controller state (spec §3).
#[derive(Debug, Clone)]
pub struct StreamState {
    /// Rolling window of the last few raw tokens fed in (bounded to 8,
    /// spec §4.9).
    pub tokens: Vec<String>,
    pub last_dist: BucketDist,
    pub alpha: f64,
    pub lock_until: Option<Instant>,
    pub lock_tone: Option<Bucket>,
    pub last_addressee: Option<String>,
    pub last_timestamp: Option<Instant>,
    pub last_second_person_count: u32,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            last_dist: BucketDist::default(),
            alpha: 0.6,
            lock_until: None,
            lock_tone: None,
            last_addressee: None,
            last_timestamp: None,
            last_second_person_count: 0,
        }
    }
}

impl StreamState {
    /// `true` while a provisional lock is still in effect at `now`.
    pub fn is_locked(&self, now: Instant) -> bool {
        matches!(self.lock_until, Some(until) if now < until)
    }
}

/// Short-lived memory keyed by field id, used for hysteresis rules in
/// `ToneScorer` (spec §3, §4.6 step 8).
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    pub last_tone: Bucket,
    pub timestamp: Instant,
    pub second_person_count: u32,
    pub addressee: Option<String>,
}

impl ConversationMemory {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.timestamp).as_millis()
            <= CONVERSATION_MEMORY_TTL_MS as u128
    }
}
