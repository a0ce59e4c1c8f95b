//! `hypothesisForAdvice` (spec §4.11): turn an `AdviceItem` into the NLI
//! hypothesis sentence tested against the user's message (the premise).
//! When the item declares `intents[]`, its first intent is looked up in a
//! fixed intent→sentence table; otherwise the advice text itself is
//! pattern-matched against a small fallback table. Memoized by `item.id`.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tone_core::AdviceItem;

pub const HYPOTHESIS_CACHE_CAPACITY: usize = 1_000;

/// Fixed intent → hypothesis-sentence table (spec §4.11: "~40-entry").
/// Every hypothesis is phrased as a claim the premise either entails or
/// contradicts — "This message is about ...".
const INTENT_HYPOTHESES: &[(&str, &str)] = &[
    ("express_anger", "This message expresses anger or frustration."),
    ("express_sadness", "This message expresses sadness or hurt."),
    ("express_anxiety", "This message expresses anxiety or worry."),
    ("seek_validation", "This message is seeking validation or reassurance."),
    ("seek_space", "This message is asking for space or distance."),
    ("seek_reconnection", "This message is asking to reconnect or repair."),
    ("express_withdrawal", "This message shows the speaker withdrawing or shutting down."),
    ("express_criticism", "This message is criticizing the other person."),
    ("express_defensiveness", "This message is defending against criticism."),
    ("express_contempt", "This message shows contempt or disrespect."),
    ("express_gratitude", "This message expresses gratitude or appreciation."),
    ("express_love", "This message expresses love or affection."),
    ("set_boundary", "This message is setting a boundary."),
    ("apologize", "This message is an apology."),
    ("request_change", "This message is requesting the other person change a behavior."),
    ("express_confusion", "This message expresses confusion about the relationship."),
    ("express_jealousy", "This message expresses jealousy or insecurity."),
    ("express_fear_of_abandonment", "This message expresses fear of being abandoned."),
    ("seek_clarity", "This message is asking for clarity about where things stand."),
    ("express_overwhelm", "This message expresses feeling overwhelmed."),
    ("express_loneliness", "This message expresses loneliness."),
    ("express_trust_issue", "This message expresses difficulty trusting the other person."),
    ("express_commitment", "This message expresses commitment to the relationship."),
    ("express_doubt", "This message expresses doubt about the relationship."),
    ("de_escalate", "This message is trying to de-escalate a conflict."),
    ("escalate", "This message is escalating a conflict."),
    ("name_feeling", "This message names a specific feeling."),
    ("ask_for_support", "This message is asking for emotional support."),
    ("offer_support", "This message is offering emotional support."),
    ("express_resentment", "This message expresses resentment."),
    ("express_hope", "This message expresses hope about the relationship."),
    ("express_hopelessness", "This message expresses hopelessness about the relationship."),
    ("clarify_intent", "This message is clarifying the speaker's intent."),
    ("acknowledge_impact", "This message acknowledges the impact of the speaker's actions."),
    ("express_needs", "This message expresses a personal need."),
    ("express_boundaries_violation", "This message describes a boundary being violated."),
    ("seek_compromise", "This message is seeking a compromise."),
    ("express_pride", "This message expresses pride in the relationship or partner."),
    ("express_regret", "This message expresses regret."),
    ("check_in", "This message is checking in on how the other person is doing."),
    ("reassure", "This message is reassuring the other person."),
];

/// Small fallback table for items with no declared `intents[]`: advice text
/// substrings mapped to a hypothesis (spec §4.11: "pattern-match the advice
/// text to a small fallback table").
const TEXT_PATTERN_HYPOTHESES: &[(&str, &str)] = &[
    ("breath", "This message describes a moment of high emotional intensity."),
    ("name the feeling", "This message would benefit from naming a specific feeling."),
    ("i feel", "This message uses \"I\" statements to express feelings."),
    ("boundary", "This message is about setting or respecting a boundary."),
    ("listen", "This message is about listening to the other person."),
    ("space", "This message is about needing space."),
    ("sorry", "This message is an apology or expression of regret."),
    ("appreciate", "This message expresses appreciation."),
];

const DEFAULT_HYPOTHESIS: &str = "This message relates to the advice given.";

fn lookup_intent(intent: &str) -> Option<&'static str> {
    INTENT_HYPOTHESES
        .iter()
        .find(|(name, _)| *name == intent)
        .map(|(_, h)| *h)
}

fn lookup_text_pattern(advice_lower: &str) -> Option<&'static str> {
    TEXT_PATTERN_HYPOTHESES
        .iter()
        .find(|(pattern, _)| advice_lower.contains(pattern))
        .map(|(_, h)| *h)
}

/// Pure hypothesis derivation, uncached (spec §4.11).
pub fn hypothesis_for_advice(item: &AdviceItem) -> String {
    if let Some(intent) = item.intents.first() {
        if let Some(h) = lookup_intent(intent) {
            return h.to_string();
        }
        tracing::debug!(intent = %intent, "advice_nli.hypothesis.unknown_intent");
    }

    let advice_lower = item.advice.to_lowercase();
    lookup_text_pattern(&advice_lower)
        .unwrap_or(DEFAULT_HYPOTHESIS)
        .to_string()
}

/// LRU-memoized hypothesis lookup, keyed by `item.id` (spec §4.11: "LRU
/// ≤1000").
pub struct HypothesisCache {
    cache: Mutex<LruCache<String, String>>,
}

impl HypothesisCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_or_compute(&self, item: &AdviceItem) -> String {
        let mut cache = self.cache.lock();
        if let Some(h) = cache.get(&item.id) {
            return h.clone();
        }
        let h = hypothesis_for_advice(item);
        cache.put(item.id.clone(), h.clone());
        h
    }
}

impl Default for HypothesisCache {
    fn default() -> Self {
        Self::new(HYPOTHESIS_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn item(id: &str, intents: Vec<&str>, advice: &str) -> AdviceItem {
        AdviceItem {
            id: id.to_string(),
            advice: advice.to_string(),
            trigger_tone: tone_core::Bucket::Caution,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: HashMap::new(),
            categories: vec![],
            intents: intents.into_iter().map(String::from).collect(),
            context_link: vec![],
            patterns: vec![],
            tags: vec![],
            style_tuning: HashMap::new(),
            boost_sources: vec![],
            keywords: vec![],
            negation_sensitive: false,
        }
    }

    #[test]
    fn intent_table_hit_wins_over_text_pattern() {
        let it = item("a", vec!["set_boundary"], "take a breath first");
        assert_eq!(hypothesis_for_advice(&it), "This message is setting a boundary.");
    }

    #[test]
    fn falls_back_to_text_pattern_when_no_intent() {
        let it = item("a", vec![], "take a breath before responding");
        assert!(hypothesis_for_advice(&it).contains("emotional intensity"));
    }

    #[test]
    fn falls_back_to_default_when_nothing_matches() {
        let it = item("a", vec![], "xyz unrelated advice text");
        assert_eq!(hypothesis_for_advice(&it), DEFAULT_HYPOTHESIS);
    }

    #[test]
    fn cache_memoizes_by_item_id() {
        let cache = HypothesisCache::new(4);
        let it = item("a", vec!["apologize"], "");
        let h1 = cache.get_or_compute(&it);
        let h2 = cache.get_or_compute(&it);
        assert_eq!(h1, h2);
    }
}
