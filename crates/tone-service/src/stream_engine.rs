//! `toneLive` (spec §4.9, §6): wires `tone_stream::ToneStreamController`
//! to the per-character feed contract — `feedChar`, `getCurrent`,
//! `resetConversationMemory` — by computing each token's raw `BucketDist`
//! from a lightweight C2 scan plus a profanity-lexicon heat bump, then
//! handing it to the controller for windowing/EWMA/locking.
//!
//! This is deliberately cheaper than a full `analyzeTone` pass: spec §4.9
//! scopes `_fastToken` to "C2 scan + intensity bump", not the whole
//! C3-C8 pipeline, so there's no `LocalNlp::analyze` call per keystroke.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;
use tone_config::{ConfigProvider, ProfanitySeverity, Targeting};
use tone_core::{Bucket, BucketDist};
use tone_match::TokenScanner;
use tone_score::AttachmentToneMap;
use tone_stream::{LockTrigger, ToneStreamController};

/// Per-bucket log-score cap before the exponential/normalize step (spec
/// §4.9: "clamp per-bucket log <= 6.0").
const LOG_SCORE_CAP: f64 = 6.0;

/// Weight split for a profanity heat bump (spec §4.9's
/// `intensityBump * {alert:0.6, caution:0.2}`, read here off a lexicon hit
/// rather than a separate intensity-modifier pass since a single token
/// rarely spans an intensifier + its target).
const PROFANITY_ALERT_SHARE: f64 = 0.6;
const PROFANITY_CAUTION_SHARE: f64 = 0.2;

fn bucket_index(bucket: Bucket) -> usize {
    match bucket {
        Bucket::Clear => 0,
        Bucket::Caution => 1,
        Bucket::Alert => 2,
    }
}

fn is_second_person(token_lower: &str) -> bool {
    matches!(token_lower, "you" | "you're" | "youre" | "your" | "yours" | "u")
}

/// Threat-intent phrases (spec §4.9/§4.6 step 2: `I('ll|will|'m gonna)…
/// (hurt|ruin|report|expose|fire|destroy|kill|harm)` / `or else`).
const THREAT_PHRASES: &[&str] = &[
    "i'll hurt", "i will hurt", "im gonna hurt", "i'm gonna hurt",
    "i'll ruin", "i will ruin", "im gonna ruin", "i'm gonna ruin",
    "i'll report", "i will report", "im gonna report", "i'm gonna report",
    "i'll expose", "i will expose", "im gonna expose", "i'm gonna expose",
    "i'll fire", "i will fire",
    "i'll destroy", "i will destroy", "im gonna destroy", "i'm gonna destroy",
    "i'll kill", "i will kill",
    "i'll harm", "i will harm",
    "or else",
];

/// First-token command verbs that, combined with a second-person pronoun
/// in the same window and a heat marker, read as a targeted imperative
/// (spec §4.9/§4.6 step 2).
const IMPERATIVE_COMMAND_VERBS: &[&str] = &["shut", "stop", "quit", "leave", "get", "back", "drop", "listen", "go"];

/// Dismissive markers (spec §4.6 step 2: "dismissive markers... rhetorical-
/// question heat" contribute alongside heat punctuation).
const DISMISSIVE_MARKERS: &[&str] = &["whatever", "fine", "i guess", "cool story", "ok then", "okay then", "sure, whatever"];

/// Classify which provisional-lock trigger class, if any, this token update
/// matches (spec §4.9: differentiated lock tone/duration by trigger class).
/// `heat` is the punctuation cue for this boundary char (`!`/`?`).
fn classify_lock_trigger(window: &[String], new_token: &str, heat: bool, config: &ConfigProvider) -> LockTrigger {
    let lower_new = new_token.to_lowercase();
    let second_person_in_window = window.iter().any(|t| is_second_person(&t.to_lowercase()));

    for category in config.profanity_lexicons() {
        if category.trigger_words.iter().any(|w| w.to_lowercase() == lower_new) {
            let severe = category.severity == ProfanitySeverity::Strong;
            let targeted = category.targeting == Targeting::Other && second_person_in_window;
            if severe || targeted {
                return LockTrigger::SevereOrTargetedProfanity;
            }
        }
    }

    let joined = window.join(" ").to_lowercase();
    if THREAT_PHRASES.iter().any(|p| joined.contains(p)) {
        return LockTrigger::ThreatOrTargetedImperative;
    }
    let first_token_is_imperative = window
        .first()
        .map(|t| IMPERATIVE_COMMAND_VERBS.contains(&t.to_lowercase().as_str()))
        .unwrap_or(false);
    if first_token_is_imperative && second_person_in_window && heat {
        return LockTrigger::ThreatOrTargetedImperative;
    }

    if heat && DISMISSIVE_MARKERS.iter().any(|d| joined.contains(d)) {
        return LockTrigger::DismissiveHeat;
    }

    LockTrigger::None
}

/// Rolling token window size, mirroring `tone_stream`'s own `TOKEN_WINDOW`
/// (spec §4.9: scanning happens over "the last 8 tokens", not a lone
/// just-completed one, so a multi-word trigger phrase split across token
/// boundaries is still found).
const TOKEN_WINDOW: usize = 8;

/// Score the last-8-tokens window (spec §4.9 `_fastToken`): C2 scan over
/// the joined window text plus a profanity-lexicon heat bump on the
/// newest token.
fn score_window(window: &[String], new_token: &str, context: &str, config: &ConfigProvider, scanner: &TokenScanner) -> BucketDist {
    let mut log_scores = [0.0_f64; 3];
    let joined = window.join(" ");

    for hit in scanner.scan(&joined, context, config.tone_trigger_words()) {
        log_scores[bucket_index(hit.bucket)] += hit.weight;
    }

    let lower = new_token.to_lowercase();
    for category in config.profanity_lexicons() {
        if category.trigger_words.iter().any(|w| w.to_lowercase() == lower) {
            let bump = category.severity.alert_boost();
            log_scores[bucket_index(Bucket::Alert)] += bump * PROFANITY_ALERT_SHARE;
            log_scores[bucket_index(Bucket::Caution)] += bump * PROFANITY_CAUTION_SHARE;
        }
    }

    for v in &mut log_scores {
        *v = v.clamp(0.0, LOG_SCORE_CAP);
    }
    BucketDist::from_raw(log_scores[0].exp(), log_scores[1].exp(), log_scores[2].exp())
}

/// Per-field incremental char buffer plus the shared `ToneStreamController`
/// (spec §4.9 owns the windowing; this owns only the char->token split).
pub struct StreamEngine {
    controller: ToneStreamController,
    pending: Mutex<HashMap<String, String>>,
    windows: Mutex<HashMap<String, Vec<String>>>,
}

impl Default for StreamEngine {
    fn default() -> Self {
        Self {
            controller: ToneStreamController::default(),
            pending: Mutex::new(HashMap::new()),
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl StreamEngine {
    /// Feed one character for `field_id` (spec §4.9 `feedChar`). Token/
    /// sentence boundaries trigger a scored update; any other character
    /// just extends the pending buffer and returns the unchanged current
    /// distribution.
    pub fn feed_char(
        &self,
        field_id: &str,
        ch: char,
        context: &str,
        config: &ConfigProvider,
        scanner: &TokenScanner,
        now: Instant,
    ) -> BucketDist {
        let is_sentence_end = matches!(ch, '.' | '!' | '?');
        let is_boundary = ch.is_whitespace() || is_sentence_end;

        if !is_boundary {
            let mut pending = self.pending.lock();
            pending.entry(field_id.to_string()).or_default().push(ch);
            drop(pending);
            return self.controller.current(field_id, now);
        }

        let token = {
            let mut pending = self.pending.lock();
            pending.entry(field_id.to_string()).or_default().trim().to_string()
        };
        self.pending.lock().insert(field_id.to_string(), String::new());

        if token.is_empty() {
            return self.controller.current(field_id, now);
        }

        let window = {
            let mut windows = self.windows.lock();
            let entry = windows.entry(field_id.to_string()).or_default();
            entry.push(token.clone());
            if entry.len() > TOKEN_WINDOW {
                entry.remove(0);
            }
            entry.clone()
        };

        let raw_dist = score_window(&window, &token, context, config, scanner);
        let heat = is_sentence_end && matches!(ch, '!' | '?');
        let trigger = classify_lock_trigger(&window, &token, heat, config);
        let out = self.controller.feed(field_id, &token, raw_dist, trigger, now);

        let token_lower = token.to_lowercase();
        let second_person = is_second_person(&token_lower);
        self.controller.record_addressee(
            field_id,
            if second_person { Some(token_lower) } else { None },
            second_person as u32,
        );

        if is_sentence_end {
            self.controller.finalize_conversation_memory(field_id, field_id, now);
        }

        out
    }

    /// `toneLive.get(fieldId, context, style)` (spec §6): read the current
    /// distribution without feeding input, remapped through the
    /// attachment-aware tone table the same way `analyzeTone` remaps its
    /// primary bucket.
    pub fn get(&self, field_id: &str, attachment_style: &str, attachment_map: &AttachmentToneMap, now: Instant) -> BucketDist {
        let mut dist = self.controller.current(field_id, now);
        for candidate in Bucket::ALL {
            if candidate != dist.primary && attachment_map.matches(attachment_style, dist.primary, candidate) {
                dist.primary = candidate;
                break;
            }
        }
        dist
    }

    /// Drop all state for `field_id` (spec §4.9 `reset(fieldId)`).
    pub fn reset(&self, field_id: &str) {
        self.controller.reset(field_id);
        self.pending.lock().remove(field_id);
        self.windows.lock().remove(field_id);
    }

    /// `resetConversationMemory(fieldId?)` (spec §6): a specific field's
    /// memory when given, otherwise every field's.
    pub fn reset_conversation_memory(&self, field_id: Option<&str>) {
        match field_id {
            Some(id) => self.controller.reset_conversation_memory(id),
            None => self.controller.reset_all_conversation_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use tone_config::ConfigProvider;

    fn config() -> ConfigProvider {
        let mut raw = Map::new();
        raw.insert("therapyAdvice".to_string(), serde_json::json!([]));
        raw.insert(
            "toneTriggerWords".to_string(),
            serde_json::json!({
                "alert": [{"text": "shut up", "intensity": 0.9, "type": "phrase"}]
            }),
        );
        raw.insert("toneBucketMapping".to_string(), serde_json::json!({}));
        raw.insert("contextClassifier".to_string(), serde_json::json!({}));
        ConfigProvider::from_blobs(raw).unwrap()
    }

    #[test]
    fn feeding_a_full_word_then_space_triggers_a_scored_update() {
        let engine = StreamEngine::default();
        let config = config();
        let scanner = TokenScanner::new(config.tone_trigger_words(), tone_match::ScanMode::Hybrid).unwrap();
        let now = Instant::now();

        for ch in "shut".chars() {
            engine.feed_char("f1", ch, "general", &config, &scanner, now);
        }
        let out = engine.feed_char("f1", ' ', "general", &config, &scanner, now);
        assert_eq!(out.primary, Bucket::Clear);

        for ch in "up".chars() {
            engine.feed_char("f1", ch, "general", &config, &scanner, now);
        }
        let out = engine.feed_char("f1", ' ', "general", &config, &scanner, now);
        assert_eq!(out.primary, Bucket::Alert);
    }

    #[test]
    fn reset_clears_buffer_and_controller_state() {
        let engine = StreamEngine::default();
        let config = config();
        let scanner = TokenScanner::new(config.tone_trigger_words(), tone_match::ScanMode::Hybrid).unwrap();
        let now = Instant::now();
        engine.feed_char("f1", 'h', "general", &config, &scanner, now);
        engine.reset("f1");
        assert_eq!(engine.controller.current("f1", now).primary, Bucket::Clear);
    }
}
