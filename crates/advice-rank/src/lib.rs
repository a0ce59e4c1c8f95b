//! C12 AdviceRanker: the ten-step scoring-and-diversification pipeline that
//! turns a pool of candidate `AdviceItem`s into the final ranked
//! `Suggestion` list (spec §4.12).
//!
//! Order: guardrail battery (1) -> NLI fit gate, batched (2) -> attachment
//! overrides (3) -> additive ranking score (4) -> temperature calibration
//! (5) -> duplicate penalty (6) -> deterministic sort (7) -> NLI signal
//! shaping (8) -> category-guard dedupe + MMR diversify (9) -> per-context
//! confidence floor (10).

pub mod diversify;
pub mod error;
pub mod guardrails;
pub mod intents;
pub mod profanity;
pub mod scoring;
pub mod weights;

pub use error::RankError;
pub use intents::detect_user_intents;

use advice_nli::NliGate;
use std::collections::HashMap;
use tone_config::{
    AttachmentOverridesConfig, AttachmentToneWeights, EvaluationTonesConfig, GuardrailConfig,
    LearningSignalsConfig, ProfanityLexiconsConfig, TonePatternsConfig, WeightModifiers,
};
use tone_core::{AdviceItem, Bucket, BucketDist, CompactDoc, Suggestion, SuggestionType};
use tone_score::AttachmentToneMap;

/// Everything the ranker needs for one request, borrowed for the call's
/// duration. Bundles the config blobs `rank()` reads so callers (the
/// service orchestrator) don't have to thread a dozen separate arguments.
pub struct RankRequest<'a> {
    pub text: &'a str,
    pub doc: &'a CompactDoc,
    pub classification: &'a str,
    pub context: &'a str,
    pub dist: &'a BucketDist,
    pub intensity: f64,
    pub attachment_style: &'a str,
    pub severity_baseline: f64,
    pub coordinator_confidence: f64,
    pub is_premium: bool,
    pub user_pref_categories: &'a HashMap<String, f64>,
    pub coordinator_intents: &'a [String],
    pub max_suggestions: usize,
    pub mmr_lambda: Option<f64>,
    pub disable_weight_fallbacks: bool,
    pub vectors: Option<&'a advice_index::AdviceIndex>,
}

/// Config blobs consulted by `rank()`, grouped so call sites pass one
/// reference instead of nine.
pub struct RankConfig<'a> {
    pub guardrail: &'a GuardrailConfig,
    pub profanity_lexicon: &'a ProfanityLexiconsConfig,
    pub weight_modifiers: &'a WeightModifiers,
    pub tone_patterns: &'a TonePatternsConfig,
    pub attachment_tone_weights: &'a AttachmentToneWeights,
    pub attachment_overrides: &'a AttachmentOverridesConfig,
    pub learning_signals: &'a LearningSignalsConfig,
    pub evaluation_tones: &'a EvaluationTonesConfig,
    pub attachment_tone_map: &'a AttachmentToneMap,
}

fn attachment_category_boost(categories: &[String], style: &str, overrides: &AttachmentOverridesConfig) -> f64 {
    let Some(entry) = overrides.by_style.get(style) else {
        return 0.0;
    };
    categories.iter().filter_map(|c| entry.category_boost.get(c)).sum()
}

/// Run the full ranking pipeline over `candidates`, returning up to
/// `request.max_suggestions` ranked `Suggestion`s (spec §4.12).
pub async fn rank(
    candidates: Vec<AdviceItem>,
    nli: &NliGate,
    request: &RankRequest<'_>,
    config: &RankConfig<'_>,
) -> Vec<Suggestion> {
    let primary_bucket = request.dist.primary;
    let has_negation = request.doc.has_negation();
    let user_intents = detect_user_intents(request.text);

    // Step 1: contraindications + guardrail battery.
    let mut survivors: Vec<(AdviceItem, profanity::ProfanityScan)> = Vec::new();
    for item in candidates {
        let ctx = guardrails::GuardrailContext {
            text: request.text,
            doc: request.doc,
            context: request.context,
            intensity: request.intensity,
            has_negation,
            primary_bucket,
            guardrail: config.guardrail,
            profanity_lexicon: config.profanity_lexicon,
        };
        match guardrails::evaluate(&item, &ctx) {
            Ok(scan) => survivors.push((item, scan)),
            Err(reason) => {
                tracing::debug!(item = %item.id, reason = reason.as_str(), "advice_rank.guardrail.rejected");
            }
        }
    }
    if survivors.is_empty() {
        return Vec::new();
    }

    // Step 2: NLI fit gate, batched.
    let items: Vec<&AdviceItem> = survivors.iter().map(|(item, _)| item).collect();
    let verdicts = nli
        .check_batch(
            request.text,
            request.doc,
            request.classification,
            &items,
            &user_intents,
            Some(config.evaluation_tones.nli_thresholds_for(request.context)),
        )
        .await;

    let mut gated: Vec<(AdviceItem, profanity::ProfanityScan, advice_nli::NliVerdict)> = Vec::new();
    for ((item, scan), verdict) in survivors.into_iter().zip(verdicts) {
        if verdict.ok {
            gated.push((item, scan, verdict));
        } else {
            tracing::debug!(item = %item.id, reason = %verdict.reason, "advice_rank.nli.rejected");
        }
    }
    if gated.is_empty() {
        return Vec::new();
    }

    // Step 3: attachment overrides + step 4: additive ranking score.
    let weights = weights::resolve(request.context, config.weight_modifiers, request.disable_weight_fallbacks);
    let mut scored: Vec<(AdviceItem, f64, advice_nli::NliVerdict)> = Vec::new();
    for (item, scan, verdict) in gated {
        let attachment_boost = attachment_category_boost(&item.categories, request.attachment_style, config.attachment_overrides);
        let inputs = scoring::ScoringInputs {
            text: request.text,
            doc: request.doc,
            item: &item,
            dist: request.dist,
            attachment_style: request.attachment_style,
            attachment_map: config.attachment_tone_map,
            context: request.context,
            severity_baseline: request.severity_baseline,
            intensity: request.intensity,
            coordinator_confidence: request.coordinator_confidence,
            is_premium: request.is_premium,
            user_pref_categories: request.user_pref_categories,
            user_intents: &user_intents,
            coordinator_intents: request.coordinator_intents,
            tone_patterns: config.tone_patterns,
            attachment_tone_weights: config.attachment_tone_weights,
            learning_signals: config.learning_signals,
            weights: &weights,
            profanity_alert_boost: scan.max_alert_boost(),
        };
        let raw = scoring::raw_score(&inputs) + attachment_boost;

        // Step 5: temperature calibration.
        let calibrated = scoring::calibrate_temperature(raw, request.context, request.intensity);
        scored.push((item, calibrated, verdict));
    }

    // Step 6: duplicate penalty (provisional score-descending order).
    let mut with_verdicts: Vec<((AdviceItem, f64), advice_nli::NliVerdict)> =
        scored.into_iter().map(|(item, score, verdict)| ((item, score), verdict)).collect();
    with_verdicts.sort_by(|a, b| b.0 .1.partial_cmp(&a.0 .1).unwrap_or(std::cmp::Ordering::Equal));
    let mut penalized: Vec<(AdviceItem, f64)> = with_verdicts.iter().map(|(pair, _)| pair.clone()).collect();
    diversify::apply_duplicate_penalty(&mut penalized);

    // Step 8: NLI signal shaping, applied alongside the duplicate penalty
    // so the authoritative sort below reflects every additive adjustment.
    let mut shaped: Vec<(AdviceItem, f64)> = Vec::with_capacity(penalized.len());
    for ((item, score), (_, verdict)) in penalized.into_iter().zip(with_verdicts.into_iter()) {
        let shaping = match (verdict.entail, verdict.contra) {
            (Some(entail), Some(contra)) => diversify::nli_signal_shaping(entail, contra),
            _ => 0.0,
        };
        shaped.push((item, score + shaping));
    }

    // Step 7: deterministic sort.
    diversify::deterministic_sort(&mut shaped);

    // Step 9: category-guard dedupe + MMR diversify.
    let pooled = diversify::diversify(shaped, request.max_suggestions, request.mmr_lambda, request.vectors);

    // Step 10: per-context confidence floor (keep the single strongest
    // item if nothing clears the floor).
    let floor = config.evaluation_tones.min_confidence_for(request.context);
    let mut confidences: Vec<(AdviceItem, f64, f64)> = pooled
        .into_iter()
        .map(|(item, score)| {
            let confidence = scoring::confidence_from_score(score);
            (item, score, confidence)
        })
        .collect();

    let passing: Vec<&(AdviceItem, f64, f64)> = confidences.iter().filter(|(_, _, conf)| *conf >= floor).collect();
    let keep_all = passing.is_empty() && !confidences.is_empty();
    if keep_all {
        confidences.truncate(1);
    } else {
        confidences.retain(|(_, _, conf)| *conf >= floor);
    }

    confidences
        .into_iter()
        .enumerate()
        .map(|(idx, (item, _score, confidence))| to_suggestion(item, confidence, idx, request))
        .collect()
}

fn to_suggestion(item: AdviceItem, confidence: f64, rank_index: usize, request: &RankRequest<'_>) -> Suggestion {
    let category = item.categories.first().cloned().unwrap_or_else(|| "general".to_string());
    Suggestion {
        id: item.id,
        text: item.advice,
        confidence,
        reason: format!("tone={:?} context={} intensity={:.2}", request.dist.primary, request.context, request.intensity),
        category,
        priority: rank_index as u32,
        context_specific: !item.contexts.is_empty(),
        attachment_informed: !item.attachment_styles.is_empty(),
        suggestion_type: SuggestionType::MicroAdvice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advice_nli::NliConfig;
    use std::collections::HashMap as Map;
    use tone_core::BucketDist;

    fn item(id: &str, tone: Bucket) -> AdviceItem {
        AdviceItem {
            id: id.to_string(),
            advice: format!("try naming the feeling and taking a breath, item {id}"),
            trigger_tone: tone,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: Map::new(),
            categories: vec!["de-escalation".to_string()],
            intents: vec![],
            context_link: vec![],
            patterns: vec![],
            tags: vec![],
            style_tuning: Map::new(),
            boost_sources: vec![],
            keywords: vec![],
            negation_sensitive: false,
        }
    }

    fn empty_config() -> (
        GuardrailConfig,
        ProfanityLexiconsConfig,
        WeightModifiers,
        TonePatternsConfig,
        AttachmentToneWeights,
        AttachmentOverridesConfig,
        LearningSignalsConfig,
        EvaluationTonesConfig,
        tone_config::ToneBucketMapping,
    ) {
        (
            GuardrailConfig::default(),
            Vec::new(),
            WeightModifiers::default(),
            Vec::new(),
            AttachmentToneWeights::default(),
            AttachmentOverridesConfig::default(),
            LearningSignalsConfig::default(),
            EvaluationTonesConfig::default(),
            tone_config::ToneBucketMapping::default(),
        )
    }

    #[tokio::test]
    async fn rank_returns_at_least_one_item_when_nothing_clears_confidence_floor() {
        let (guardrail, profanity, weight_modifiers, tone_patterns, attachment_tone_weights, attachment_overrides, learning_signals, mut evaluation_tones, mapping) =
            empty_config();
        evaluation_tones.min_confidence_default = 0.999;
        let attachment_tone_map = AttachmentToneMap::build(&mapping);
        let config = RankConfig {
            guardrail: &guardrail,
            profanity_lexicon: &profanity,
            weight_modifiers: &weight_modifiers,
            tone_patterns: &tone_patterns,
            attachment_tone_weights: &attachment_tone_weights,
            attachment_overrides: &attachment_overrides,
            learning_signals: &learning_signals,
            evaluation_tones: &evaluation_tones,
            attachment_tone_map: &attachment_tone_map,
        };
        let doc = CompactDoc::fallback("I feel anxious about this");
        let dist = BucketDist::from_raw(0.2, 0.7, 0.1);
        let nli = NliGate::new(None, NliConfig { disabled: true, ..NliConfig::default() });

        let request = RankRequest {
            text: "I feel anxious about this",
            doc: &doc,
            classification: "caution",
            context: "general",
            dist: &dist,
            intensity: 0.4,
            attachment_style: "secure",
            severity_baseline: 0.3,
            coordinator_confidence: 0.6,
            is_premium: false,
            user_pref_categories: &Map::new(),
            coordinator_intents: &[],
            max_suggestions: 3,
            mmr_lambda: None,
            disable_weight_fallbacks: false,
            vectors: None,
        };

        let candidates = vec![item("a", Bucket::Caution), item("b", Bucket::Caution)];
        let out = rank(candidates, &nli, &request, &config).await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn rank_drops_blocked_items_entirely() {
        let (mut guardrail, profanity, weight_modifiers, tone_patterns, attachment_tone_weights, attachment_overrides, learning_signals, evaluation_tones, mapping) =
            empty_config();
        guardrail.block = vec!["naming the feeling".to_string()];
        let attachment_tone_map = AttachmentToneMap::build(&mapping);
        let config = RankConfig {
            guardrail: &guardrail,
            profanity_lexicon: &profanity,
            weight_modifiers: &weight_modifiers,
            tone_patterns: &tone_patterns,
            attachment_tone_weights: &attachment_tone_weights,
            attachment_overrides: &attachment_overrides,
            learning_signals: &learning_signals,
            evaluation_tones: &evaluation_tones,
            attachment_tone_map: &attachment_tone_map,
        };
        let doc = CompactDoc::fallback("I feel anxious about this");
        let dist = BucketDist::from_raw(0.2, 0.7, 0.1);
        let nli = NliGate::new(None, NliConfig { disabled: true, ..NliConfig::default() });

        let request = RankRequest {
            text: "I feel anxious about this",
            doc: &doc,
            classification: "caution",
            context: "general",
            dist: &dist,
            intensity: 0.4,
            attachment_style: "secure",
            severity_baseline: 0.3,
            coordinator_confidence: 0.6,
            is_premium: false,
            user_pref_categories: &Map::new(),
            coordinator_intents: &[],
            max_suggestions: 3,
            mmr_lambda: None,
            disable_weight_fallbacks: false,
            vectors: None,
        };

        let candidates = vec![item("a", Bucket::Caution)];
        let out = rank(candidates, &nli, &request, &config).await;
        assert!(out.is_empty());
    }
}
