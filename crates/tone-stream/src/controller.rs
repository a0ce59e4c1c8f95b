//! C9 ToneStream: per-field incremental tone controller (spec §4.9).
//!
//! The controller is deliberately decoupled from how a `BucketDist` gets
//! computed — callers run `tone-score` themselves on the partial text and
//! feed the result in; this crate owns only the token window, EWMA
//! smoothing, provisional locking, and conversation memory.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tone_core::{Bucket, BucketDist, ConversationMemory, StreamState};

/// Rolling token window size (spec §4.9).
const TOKEN_WINDOW: usize = 8;

/// Which provisional-lock rule fired for a token update, if any (spec
/// §4.9: "severe or targeted 2nd person -> provisional-lock alert for
/// ≤500 ms"; "threats/targeted imperatives -> lock alert ≤400 ms";
/// "dismissive+heat -> lock caution ≤400 ms"). The caller (which has the
/// profanity/threat/dismissive detectors) decides which, if any, class
/// matched this token; the controller only owns tone/duration and the
/// wall-clock bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTrigger {
    None,
    SevereOrTargetedProfanity,
    ThreatOrTargetedImperative,
    DismissiveHeat,
}

impl LockTrigger {
    fn lock(self) -> Option<(Bucket, Duration)> {
        match self {
            LockTrigger::None => None,
            LockTrigger::SevereOrTargetedProfanity => Some((Bucket::Alert, Duration::from_millis(500))),
            LockTrigger::ThreatOrTargetedImperative => Some((Bucket::Alert, Duration::from_millis(400))),
            LockTrigger::DismissiveHeat => Some((Bucket::Caution, Duration::from_millis(400))),
        }
    }
}

/// A one-hot distribution with all mass on `bucket` (spec §4.9
/// `getCurrent()`: "return the one-hot distribution for `lockTone`").
fn one_hot(bucket: Bucket) -> BucketDist {
    match bucket {
        Bucket::Clear => BucketDist::from_raw(1.0, 0.0, 0.0),
        Bucket::Caution => BucketDist::from_raw(0.0, 1.0, 0.0),
        Bucket::Alert => BucketDist::from_raw(0.0, 0.0, 1.0),
    }
}

pub struct ToneStreamController {
    fields: Mutex<HashMap<String, StreamState>>,
    memory: Mutex<HashMap<String, ConversationMemory>>,
}

impl Default for ToneStreamController {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneStreamController {
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(HashMap::new()),
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Feed one incremental token update for `field_id`. `trigger` names
    /// any lock-worthy detector that matched this token (spec §4.9); when
    /// none did, a lock already in effect is left to run out on its own
    /// clock rather than being re-engaged. Returns the smoothed,
    /// possibly-locked distribution to show the caller.
    pub fn feed(&self, field_id: &str, token: &str, raw_dist: BucketDist, trigger: LockTrigger, now: Instant) -> BucketDist {
        let mut fields = self.fields.lock();
        let state = fields.entry(field_id.to_string()).or_default();

        if !token.is_empty() {
            state.tokens.push(token.to_string());
            if state.tokens.len() > TOKEN_WINDOW {
                state.tokens.remove(0);
            }
        }

        let alpha = state.alpha;
        let prev = state.last_dist;
        let smoothed = BucketDist::from_raw(
            alpha * raw_dist.clear + (1.0 - alpha) * prev.clear,
            alpha * raw_dist.caution + (1.0 - alpha) * prev.caution,
            alpha * raw_dist.alert + (1.0 - alpha) * prev.alert,
        );
        state.last_dist = smoothed;
        state.last_timestamp = Some(now);

        if let Some((lock_tone, duration)) = trigger.lock() {
            state.lock_until = Some(now + duration);
            state.lock_tone = Some(lock_tone);
            tracing::debug!(field_id, tone = %lock_tone, duration_ms = duration.as_millis() as u64, "stream.provisional_lock.engaged");
        }

        if state.is_locked(now) {
            if let Some(lock_tone) = state.lock_tone {
                return one_hot(lock_tone);
            }
        }
        smoothed
    }

    /// Read the current distribution for `field_id` without feeding new
    /// input (spec §4.9 `getCurrent()`): the one-hot lock tone while a
    /// provisional lock is in effect, else the smoothed distribution.
    /// Unknown fields read as the default distribution.
    pub fn current(&self, field_id: &str, now: Instant) -> BucketDist {
        let fields = self.fields.lock();
        let Some(state) = fields.get(field_id) else {
            return BucketDist::default();
        };
        if state.is_locked(now) {
            if let Some(lock_tone) = state.lock_tone {
                return one_hot(lock_tone);
            }
        }
        state.last_dist
    }

    /// Record second-person usage/addressee for the hysteresis rules in
    /// `tone-score`'s bucket mapper (spec §4.6 step 8).
    pub fn record_addressee(&self, field_id: &str, addressee: Option<String>, second_person_count: u32) {
        let mut fields = self.fields.lock();
        let state = fields.entry(field_id.to_string()).or_default();
        state.last_addressee = addressee;
        state.last_second_person_count = second_person_count;
    }

    /// Clear all state for `field_id` (spec §4.9: `reset(fieldId)`).
    pub fn reset(&self, field_id: &str) {
        self.fields.lock().remove(field_id);
    }

    /// Promote a field's current state into conversation memory, keyed by
    /// `conversation_id`, typically called at a sentence boundary.
    pub fn finalize_conversation_memory(&self, conversation_id: &str, field_id: &str, now: Instant) {
        let fields = self.fields.lock();
        let Some(state) = fields.get(field_id) else { return };
        let mem = ConversationMemory {
            last_tone: state.last_dist.primary,
            timestamp: now,
            second_person_count: state.last_second_person_count,
            addressee: state.last_addressee.clone(),
        };
        self.memory.lock().insert(conversation_id.to_string(), mem);
    }

    /// Fetch conversation memory for `conversation_id`, only if still
    /// fresh at `now` (spec §3: 10s bounded TTL).
    pub fn conversation_memory(&self, conversation_id: &str, now: Instant) -> Option<ConversationMemory> {
        let memory = self.memory.lock();
        memory.get(conversation_id).filter(|m| m.is_fresh(now)).cloned()
    }

    /// Explicitly drop conversation memory (spec §6:
    /// `resetConversationMemory`).
    pub fn reset_conversation_memory(&self, conversation_id: &str) {
        self.memory.lock().remove(conversation_id);
    }

    /// Drop conversation memory for every conversation (spec §6:
    /// `resetConversationMemory()` called with no id).
    pub fn reset_all_conversation_memory(&self) {
        self.memory.lock().clear();
    }
}
