//! The additive ranking score (spec §4.12 step 4) and its temperature
//! calibration (step 5).

use crate::weights::WeightSet;
use std::collections::HashMap;
use tone_config::{AttachmentToneWeights, LearningSignalsConfig, TonePatternsConfig};
use tone_core::{AdviceItem, BucketDist};
use tone_score::AttachmentToneMap;

const CONTEXT_LINK_BONUS_CAP: f64 = 0.12;
const TONE_PATTERN_CATEGORY_BONUS_CAP: f64 = 0.15;
const LEARNING_BUCKET_CONTEXT_CAP: f64 = 0.25;
const LEARNING_TONE_ADJUST_SCALE: f64 = 0.5;
const LEARNING_ATTACHMENT_CONSISTENCY_BONUS: f64 = 0.1;
const ACTIONABILITY_BONUS: f64 = 0.1;
const ONLINE_LEARNING_NUDGE_WEIGHT: f64 = 0.2;
const PROFANITY_ALERT_BOOST_WEIGHT: f64 = 0.3;

const RAW_SCORE_CLAMP: (f64, f64) = (-1.0, 3.0);
const CALIBRATED_SCORE_CLAMP: (f64, f64) = (-1.5, 3.5);
const TEMPERATURE_BASE: f64 = 1.0;
const TEMPERATURE_CLAMP: (f64, f64) = (0.1, 5.0);

const IMPERATIVE_VERBS: &[&str] = &[
    "try", "take", "name", "listen", "pause", "breathe", "ask", "share", "avoid", "consider",
    "practice", "acknowledge", "set", "express", "validate", "reflect", "give", "offer", "focus",
];

/// `true` when `item_tone` equals `user_bucket` (the strongest bucket), or
/// the attachment-aware cross-bucket mapping remaps another bucket's mass
/// onto `item_tone` (spec §4.12 "Attachment-aware tone matching rule").
fn tone_match_mass(dist: &BucketDist, style: &str, item_tone: tone_core::Bucket, map: &AttachmentToneMap) -> f64 {
    let mut mass = dist.get(item_tone);
    for bucket in tone_core::Bucket::ALL {
        if bucket != item_tone && map.matches(style, bucket, item_tone) {
            mass += dist.get(bucket);
        }
    }
    mass.min(1.0)
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn second_person_directness(text: &str, doc: &tone_core::CompactDoc) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    doc.second_person_entities().next().map(|e| {
        let slice: String = chars.get(e.start..e.end).unwrap_or(&[]).iter().collect();
        if slice.eq_ignore_ascii_case("you") || slice.eq_ignore_ascii_case("u") {
            1.0
        } else {
            0.6
        }
    })
}

fn category_multiplier(item: &AdviceItem, style: &str, weights: &AttachmentToneWeights) -> f64 {
    let Some(overrides) = weights.overrides.get(style) else {
        return 1.0;
    };
    item.categories
        .iter()
        .map(|c| overrides.category_multipliers.get(c).copied().unwrap_or(1.0))
        .product()
}

fn tone_pattern_category_bonus(text_lower: &str, item: &AdviceItem, patterns: &TonePatternsConfig) -> f64 {
    let mut bonus = 0.0;
    for pattern in patterns {
        if pattern.categories.iter().any(|c| item.categories.contains(c)) {
            let matched = if pattern.kind == "regex" {
                regex::RegexBuilder::new(&pattern.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| re.is_match(text_lower))
                    .unwrap_or(false)
            } else {
                text_lower.contains(&pattern.pattern.to_lowercase())
            };
            if matched {
                bonus += 0.05;
            }
        }
    }
    bonus.min(TONE_PATTERN_CATEGORY_BONUS_CAP)
}

fn learning_signal_bonus(
    text_lower: &str,
    item: &AdviceItem,
    dist: &BucketDist,
    style: &str,
    learning_signals: &LearningSignalsConfig,
) -> f64 {
    let mut bucket_context_bonus = 0.0;
    let mut attachment_consistency = 0.0;

    for feature in &learning_signals.features {
        let pattern_hit = feature.patterns.iter().any(|p| text_lower.contains(&p.to_lowercase()));
        if !pattern_hit {
            continue;
        }
        if feature.buckets.iter().any(|b| b == item.trigger_tone.as_str() || b == dist.primary.as_str()) {
            bucket_context_bonus += feature.weight;
        }
        if feature.attachment_hint.as_deref() == Some(style) {
            attachment_consistency = LEARNING_ATTACHMENT_CONSISTENCY_BONUS;
        }
    }

    bucket_context_bonus = bucket_context_bonus.min(LEARNING_BUCKET_CONTEXT_CAP);

    let tone_adjust = learning_signals
        .by_item
        .get(&item.id)
        .map(|s| (s.ctr - s.rejection_rate) * LEARNING_TONE_ADJUST_SCALE)
        .unwrap_or(0.0);

    bucket_context_bonus + tone_adjust + attachment_consistency
}

fn online_learning_nudge(item: &AdviceItem, learning_signals: &LearningSignalsConfig) -> f64 {
    learning_signals
        .by_item
        .get(&item.id)
        .map(|s| (s.ctr - s.rejection_rate) * ONLINE_LEARNING_NUDGE_WEIGHT)
        .unwrap_or(0.0)
}

fn brevity_bonus(word_count: usize) -> f64 {
    match word_count {
        0..=8 => 0.15,
        9..=15 => 0.05,
        16..=25 => 0.0,
        _ => -0.1,
    }
}

pub struct ScoringInputs<'a> {
    pub text: &'a str,
    pub doc: &'a tone_core::CompactDoc,
    pub item: &'a AdviceItem,
    pub dist: &'a BucketDist,
    pub attachment_style: &'a str,
    pub attachment_map: &'a AttachmentToneMap,
    pub context: &'a str,
    pub severity_baseline: f64,
    pub intensity: f64,
    pub coordinator_confidence: f64,
    pub is_premium: bool,
    pub user_pref_categories: &'a HashMap<String, f64>,
    pub user_intents: &'a [String],
    pub coordinator_intents: &'a [String],
    pub tone_patterns: &'a TonePatternsConfig,
    pub attachment_tone_weights: &'a AttachmentToneWeights,
    pub learning_signals: &'a LearningSignalsConfig,
    pub weights: &'a WeightSet,
    /// `ProfanityScan::max_alert_boost()` for this item's candidate text —
    /// the same severity->boost mapping C6 ties to the `angry` feature
    /// (spec §4.6 steps 5/7: `mild≈0.1, moderate≈0.2, strong≈0.4`), fed
    /// here into items whose `trigger_tone` is `alert` so a profanity-heavy
    /// message preferentially surfaces de-escalation advice.
    pub profanity_alert_boost: f64,
}

/// Compute the raw additive ranking score for one item (spec §4.12 step 4).
pub fn raw_score(inputs: &ScoringInputs<'_>) -> f64 {
    let w = inputs.weights;
    let text_lower = inputs.text.to_lowercase();
    let mut score = 0.0;

    score += w.base_confidence * inputs.coordinator_confidence;
    score += w.tone_match * tone_match_mass(inputs.dist, inputs.attachment_style, inputs.item.trigger_tone, inputs.attachment_map);

    if inputs.item.matches_context(inputs.context) {
        score += w.context_match;
    }
    let link_hits = inputs.item.context_link.iter().filter(|c| c.as_str() == inputs.context).count();
    score += (w.context_link_multiplier * link_hits as f64 * 0.06).min(CONTEXT_LINK_BONUS_CAP);

    if inputs.item.matches_attachment(inputs.attachment_style) {
        score += w.attachment_match;
    }

    score += w.intensity_boost * clamp01(inputs.intensity);

    if inputs.doc.has_negation() {
        score += w.negation_penalty;
    }
    if inputs.doc.sarcasm.present {
        score += w.sarcasm_penalty;
    }

    let edge_hits = if inputs.item.categories.is_empty() {
        inputs.doc.phrase_edges.len()
    } else {
        inputs.doc.phrase_edges.iter().filter(|e| inputs.item.categories.contains(&e.category)).count()
    };
    score += w.phrase_edge_boost * (edge_hits as f64 / 3.0).min(1.0);

    let user_pref_sum: f64 = inputs
        .item
        .categories
        .iter()
        .map(|c| inputs.user_pref_categories.get(c).copied().unwrap_or(0.0))
        .sum();
    score += w.user_pref_boost * user_pref_sum;

    if let Some(directness) = second_person_directness(inputs.text, inputs.doc) {
        score += w.second_person_boost * inputs.coordinator_confidence * directness;
    }

    if let Some(threshold) = inputs.item.severity_threshold_for(inputs.item.trigger_tone) {
        let severity_fit = 1.0 - ((threshold - inputs.severity_baseline).abs() / 0.1).min(1.0);
        score += w.severity_fit_weight * severity_fit;
    }

    if inputs.is_premium {
        score += w.premium_boost;
    }

    if inputs.item.trigger_tone == tone_core::Bucket::Alert {
        score += PROFANITY_ALERT_BOOST_WEIGHT * inputs.profanity_alert_boost;
    }

    score += tone_pattern_category_bonus(&text_lower, inputs.item, inputs.tone_patterns);
    score += learning_signal_bonus(&text_lower, inputs.item, inputs.dist, inputs.attachment_style, inputs.learning_signals);

    let first_word_is_imperative = inputs
        .item
        .advice
        .split_whitespace()
        .next()
        .map(|w| IMPERATIVE_VERBS.contains(&w.to_lowercase().trim_matches(|c: char| !c.is_alphanumeric())))
        .unwrap_or(false);
    if first_word_is_imperative {
        score += ACTIONABILITY_BONUS;
    }

    score += brevity_bonus(inputs.item.advice.split_whitespace().count());

    let matched_intents = inputs
        .user_intents
        .iter()
        .chain(inputs.coordinator_intents.iter())
        .filter(|i| inputs.item.intents.contains(i))
        .collect::<std::collections::HashSet<_>>()
        .len();
    score += w.intent_overlap_per_match * matched_intents as f64;

    score += online_learning_nudge(inputs.item, inputs.learning_signals);

    let multiplier = category_multiplier(inputs.item, inputs.attachment_style, inputs.attachment_tone_weights);
    score * multiplier
}

/// Per-context + intensity-band temperature adjustment (spec §9 Open
/// Question: no config blob names a temperature table, so this is a fixed,
/// documented decision rather than config-driven).
fn context_temperature_adjustment(ctx: &str) -> f64 {
    match ctx {
        "conflict" => 0.2,
        "repair" => -0.1,
        "crisis" => 0.3,
        _ => 0.0,
    }
}

fn intensity_temperature_adjustment(intensity: f64) -> f64 {
    if intensity < 0.3 {
        -0.1
    } else if intensity >= 0.7 {
        0.2
    } else {
        0.0
    }
}

/// Clamp the raw score, divide by a context+intensity-adjusted temperature,
/// clamp the result (spec §4.12 step 5).
pub fn calibrate_temperature(raw: f64, ctx: &str, intensity: f64) -> f64 {
    let clamped_raw = raw.clamp(RAW_SCORE_CLAMP.0, RAW_SCORE_CLAMP.1);
    let temperature = (TEMPERATURE_BASE + context_temperature_adjustment(ctx) + intensity_temperature_adjustment(intensity))
        .clamp(TEMPERATURE_CLAMP.0, TEMPERATURE_CLAMP.1);
    (clamped_raw / temperature).clamp(CALIBRATED_SCORE_CLAMP.0, CALIBRATED_SCORE_CLAMP.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use tone_config::ToneBucketMapping;
    use tone_core::Bucket;

    fn item() -> AdviceItem {
        AdviceItem {
            id: "a".to_string(),
            advice: "Try naming the feeling before responding".to_string(),
            trigger_tone: Bucket::Caution,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: Map::new(),
            categories: vec!["de-escalation".to_string()],
            intents: vec!["name_feeling".to_string()],
            context_link: vec![],
            patterns: vec![],
            tags: vec![],
            style_tuning: Map::new(),
            boost_sources: vec![],
            keywords: vec![],
            negation_sensitive: false,
        }
    }

    #[test]
    fn higher_coordinator_confidence_increases_score() {
        let doc = tone_core::CompactDoc::fallback("I feel anxious");
        let dist = BucketDist::from_raw(0.2, 0.6, 0.2);
        let map = AttachmentToneMap::build(&ToneBucketMapping::default());
        let weights = WeightSet::default();
        let learning = LearningSignalsConfig::default();
        let patterns = vec![];
        let attach_weights = AttachmentToneWeights::default();
        let prefs = Map::new();

        let mut low = ScoringInputs {
            text: "I feel anxious",
            doc: &doc,
            item: &item(),
            dist: &dist,
            attachment_style: "secure",
            attachment_map: &map,
            context: "general",
            severity_baseline: 0.5,
            intensity: 0.3,
            coordinator_confidence: 0.2,
            is_premium: false,
            user_pref_categories: &prefs,
            user_intents: &[],
            coordinator_intents: &[],
            tone_patterns: &patterns,
            attachment_tone_weights: &attach_weights,
            learning_signals: &learning,
            weights: &weights,
            profanity_alert_boost: 0.0,
        };
        let low_score = raw_score(&low);
        low.coordinator_confidence = 0.9;
        let high_score = raw_score(&low);
        assert!(high_score > low_score);
    }

    #[test]
    fn temperature_calibration_clamps_extremes() {
        assert_eq!(calibrate_temperature(100.0, "general", 0.5), CALIBRATED_SCORE_CLAMP.1);
        assert_eq!(calibrate_temperature(-100.0, "general", 0.5), CALIBRATED_SCORE_CLAMP.0);
    }

    #[test]
    fn intent_overlap_adds_bonus_per_matched_intent() {
        let doc = tone_core::CompactDoc::fallback("I feel anxious");
        let dist = BucketDist::from_raw(0.2, 0.6, 0.2);
        let map = AttachmentToneMap::build(&ToneBucketMapping::default());
        let weights = WeightSet::default();
        let learning = LearningSignalsConfig::default();
        let patterns = vec![];
        let attach_weights = AttachmentToneWeights::default();
        let prefs = Map::new();
        let it = item();

        let without_intent = ScoringInputs {
            text: "I feel anxious",
            doc: &doc,
            item: &it,
            dist: &dist,
            attachment_style: "secure",
            attachment_map: &map,
            context: "general",
            severity_baseline: 0.5,
            intensity: 0.3,
            coordinator_confidence: 0.5,
            is_premium: false,
            user_pref_categories: &prefs,
            user_intents: &[],
            coordinator_intents: &[],
            tone_patterns: &patterns,
            attachment_tone_weights: &attach_weights,
            learning_signals: &learning,
            weights: &weights,
            profanity_alert_boost: 0.0,
        };
        let base = raw_score(&without_intent);

        let mut with_intent = without_intent;
        let intents = vec!["name_feeling".to_string()];
        with_intent.user_intents = &intents;
        let boosted = raw_score(&with_intent);
        assert!(boosted > base);
    }

    #[test]
    fn profanity_alert_boost_only_lifts_alert_tone_items() {
        let doc = tone_core::CompactDoc::fallback("you are so stupid shut up");
        let dist = BucketDist::from_raw(0.1, 0.2, 0.7);
        let map = AttachmentToneMap::build(&ToneBucketMapping::default());
        let weights = WeightSet::default();
        let learning = LearningSignalsConfig::default();
        let patterns = vec![];
        let attach_weights = AttachmentToneWeights::default();
        let prefs = Map::new();

        let mut alert_item = item();
        alert_item.trigger_tone = Bucket::Alert;

        let mut inputs = ScoringInputs {
            text: "you are so stupid shut up",
            doc: &doc,
            item: &alert_item,
            dist: &dist,
            attachment_style: "secure",
            attachment_map: &map,
            context: "general",
            severity_baseline: 0.5,
            intensity: 0.7,
            coordinator_confidence: 0.5,
            is_premium: false,
            user_pref_categories: &prefs,
            user_intents: &[],
            coordinator_intents: &[],
            tone_patterns: &patterns,
            attachment_tone_weights: &attach_weights,
            learning_signals: &learning,
            weights: &weights,
            profanity_alert_boost: 0.0,
        };
        let unboosted = raw_score(&inputs);
        inputs.profanity_alert_boost = 0.4;
        let boosted = raw_score(&inputs);
        assert!(boosted > unboosted);

        let mut caution_item = item();
        caution_item.trigger_tone = Bucket::Caution;
        inputs.item = &caution_item;
        inputs.profanity_alert_boost = 0.0;
        let caution_unboosted = raw_score(&inputs);
        inputs.profanity_alert_boost = 0.4;
        let caution_boosted = raw_score(&inputs);
        assert_eq!(caution_boosted, caution_unboosted);
    }
}
