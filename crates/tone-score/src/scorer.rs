//! C6 ToneScorer: additive detector scoring over `tonePatterns` and
//! trigger-scanner hits, plus a small fixed-weight logistic meta-classifier
//! over the 12-feature vector (spec §4.6).

use tone_config::TonePatternsConfig;
use tone_core::{EmotionScores, MetaClassifier, ToneScore};
use tone_match::TriggerHit;
use tone_nlp::FeatureSet;

/// Fixed logistic weights over `FeatureSet::as_vector()`'s 12 scalar
/// features, in the same order (spec §4.6 step 3). These are a checked-in
/// calibration, not learned at runtime; `learningSignals.plattAdjust`
/// layers a second-stage correction on top in `Calibrator`.
const ALERT_WEIGHTS: [f64; 12] = [
    -0.02, // token_count
    -0.01, // sentence_count
    0.9,   // negation_scope_count
    1.1,   // negation_ratio
    0.3,   // second_person_count
    0.8,   // second_person_ratio
    0.4,   // sarcasm_score
    -0.2,  // context_confidence
    0.6,   // intensity_multiplier
    1.2,   // phrase_edge_total_weight
    0.3,   // phrase_edge_category_count
    0.7,   // exclamation_ratio
];
const ALERT_BIAS: f64 = -2.2;

const CAUTION_WEIGHTS: [f64; 12] = [
    -0.01, // token_count
    0.0,   // sentence_count
    0.5,   // negation_scope_count
    0.6,   // negation_ratio
    0.2,   // second_person_count
    0.5,   // second_person_ratio
    0.6,   // sarcasm_score
    -0.1,  // context_confidence
    0.35,  // intensity_multiplier
    0.5,   // phrase_edge_total_weight
    0.2,   // phrase_edge_category_count
    0.3,   // exclamation_ratio
];
const CAUTION_BIAS: f64 = -1.3;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Short compliment/thank-you whitelist (spec §4.6 step 1). Matching one of
/// these with no competing `alert`-bucket trigger hit pre-boosts
/// `supportive`/`positive` and later clamps the meta-classifier's alert/
/// caution probabilities so a genuine compliment never reads as hostile.
const COMPLIMENT_PATTERNS: &[&str] = &[
    "thank you",
    "thanks so much",
    "i appreciate",
    "appreciate you",
    "great job",
    "good job",
    "well done",
    "nice work",
    "proud of you",
    "i love that",
    "you're amazing",
    "youre amazing",
];

fn is_compliment(text_lower: &str, hits: &[TriggerHit]) -> bool {
    let has_alert_hit = hits.iter().any(|h| h.bucket == tone_core::Bucket::Alert);
    !has_alert_hit && COMPLIMENT_PATTERNS.iter().any(|p| text_lower.contains(p))
}

const COMPLIMENT_ALERT_CEILING: f64 = 0.15;
const COMPLIMENT_CAUTION_CEILING: f64 = 0.25;

fn logistic(features: &[f64; 12], weights: &[f64; 12], bias: f64) -> f64 {
    let dot: f64 = features.iter().zip(weights.iter()).map(|(f, w)| f * w).sum();
    sigmoid(dot + bias)
}

pub fn run_meta_classifier(features: &FeatureSet) -> MetaClassifier {
    let vec = features.as_vector();
    MetaClassifier {
        p_alert: logistic(&vec, &ALERT_WEIGHTS, ALERT_BIAS),
        p_caution: logistic(&vec, &CAUTION_WEIGHTS, CAUTION_BIAS),
    }
}

/// Additive detector pass over `tonePatterns`: every matching pattern adds
/// its `confidence` to the named emotion dimension (spec §4.6 step 1).
pub fn run_additive_detectors(
    text_lower: &str,
    patterns: &TonePatternsConfig,
) -> (EmotionScores, Vec<String>) {
    let mut scores = EmotionScores::default();
    let mut signals = Vec::new();

    for pattern in patterns {
        let matched = if pattern.kind == "regex" {
            regex::RegexBuilder::new(&pattern.pattern)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(text_lower))
                .unwrap_or(false)
        } else {
            text_lower.contains(&pattern.pattern.to_lowercase())
                || pattern
                    .semantic_variants
                    .iter()
                    .any(|v| text_lower.contains(&v.to_lowercase()))
        };
        if matched {
            scores.add(&pattern.tone, pattern.confidence);
            signals.push(format!("tone_pattern:{}", pattern.tone));
        }
    }

    (scores, signals)
}

/// Fold trigger-scanner hits into the emotion scores: `alert`-bucket hits
/// nudge `angry`/`frustrated`, `caution`-bucket hits nudge `anxious`/`sad`,
/// `clear`-bucket hits nudge `positive`/`supportive` (spec §4.6 step 2).
pub fn fold_trigger_hits(scores: &mut EmotionScores, hits: &[TriggerHit]) -> Vec<String> {
    let mut signals = Vec::with_capacity(hits.len());
    for hit in hits {
        let (a, b) = match hit.bucket {
            tone_core::Bucket::Alert => ("angry", "frustrated"),
            tone_core::Bucket::Caution => ("anxious", "sad"),
            tone_core::Bucket::Clear => ("positive", "supportive"),
        };
        scores.add(a, hit.weight * 0.6);
        scores.add(b, hit.weight * 0.4);
        signals.push(format!("trigger:{}:{}", hit.bucket, hit.term));
    }
    signals
}

/// Run the full scorer: additive detectors + trigger hits + meta-classifier,
/// returning the assembled `ToneScore` (spec §4.6).
pub fn score(
    text: &str,
    patterns: &TonePatternsConfig,
    hits: &[TriggerHit],
    features: &FeatureSet,
) -> ToneScore {
    let text_lower = text.to_lowercase();
    let (mut scores, mut signals) = run_additive_detectors(&text_lower, patterns);
    signals.extend(fold_trigger_hits(&mut scores, hits));

    let compliment = is_compliment(&text_lower, hits);
    if compliment {
        scores.add("supportive", 0.5);
        scores.add("positive", 0.5);
        signals.push("compliment_veto".to_string());
    }

    let normalized = scores.softmax();
    let classification = normalized.argmax_label().to_string();
    let mut meta_classifier = run_meta_classifier(features);
    if compliment {
        meta_classifier.p_alert = meta_classifier.p_alert.min(COMPLIMENT_ALERT_CEILING);
        meta_classifier.p_caution = meta_classifier.p_caution.min(COMPLIMENT_CAUTION_CEILING);
    }

    let intensity = (features.intensity_multiplier - 1.0).abs() + features.phrase_edge_total_weight;
    let confidence = (meta_classifier.p_alert - 0.5).abs().max((meta_classifier.p_caution - 0.5).abs()) * 2.0;

    let mut explanation = Vec::new();
    if !signals.is_empty() {
        explanation.push(format!("{} signal(s) contributed to scoring", signals.len()));
    }
    if features.negation_scope_count > 0.0 {
        explanation.push("negation scope(s) detected, may invert or soften nearby signals".to_string());
    }

    ToneScore {
        scores: normalized,
        intensity,
        confidence: confidence.clamp(0.0, 1.0),
        meta_classifier,
        signals,
        explanation,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::TonePattern;

    #[test]
    fn additive_detector_accumulates_matching_pattern() {
        let patterns = vec![TonePattern {
            kind: "phrase".to_string(),
            pattern: "i appreciate".to_string(),
            tone: "supportive".to_string(),
            confidence: 0.7,
            semantic_variants: vec![],
            categories: vec![],
        }];
        let (scores, signals) = run_additive_detectors("i appreciate you being here", &patterns);
        assert!(scores.supportive > 0.0);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn meta_classifier_outputs_are_probabilities() {
        let features = FeatureSet {
            token_count: 5.0,
            sentence_count: 1.0,
            negation_scope_count: 1.0,
            negation_ratio: 0.2,
            second_person_count: 1.0,
            second_person_ratio: 0.2,
            sarcasm_score: 0.0,
            context_confidence: 0.5,
            intensity_multiplier: 1.0,
            phrase_edge_total_weight: 0.5,
            phrase_edge_category_count: 1.0,
            exclamation_ratio: 0.2,
            phrase_edge_by_category: Default::default(),
        };
        let meta = run_meta_classifier(&features);
        assert!(meta.p_alert >= 0.0 && meta.p_alert <= 1.0);
        assert!(meta.p_caution >= 0.0 && meta.p_caution <= 1.0);
    }

    fn high_heat_features() -> FeatureSet {
        FeatureSet {
            token_count: 9.0,
            sentence_count: 1.0,
            negation_scope_count: 0.0,
            negation_ratio: 0.0,
            second_person_count: 2.0,
            second_person_ratio: 0.3,
            sarcasm_score: 0.0,
            context_confidence: 0.5,
            intensity_multiplier: 1.0,
            phrase_edge_total_weight: 0.0,
            phrase_edge_category_count: 0.0,
            exclamation_ratio: 0.3,
            phrase_edge_by_category: Default::default(),
        }
    }

    #[test]
    fn compliment_veto_clamps_alert_and_caution_probabilities() {
        let patterns: TonePatternsConfig = vec![];
        let features = high_heat_features();
        let out = score("Thank you so much, you did a great job!", &patterns, &[], &features);
        assert!(out.meta_classifier.p_alert <= COMPLIMENT_ALERT_CEILING + 1e-9);
        assert!(out.meta_classifier.p_caution <= COMPLIMENT_CAUTION_CEILING + 1e-9);
        assert!(out.signals.iter().any(|s| s == "compliment_veto"));
    }

    #[test]
    fn compliment_veto_does_not_fire_alongside_an_alert_hit() {
        let patterns: TonePatternsConfig = vec![];
        let features = high_heat_features();
        let hits = vec![TriggerHit {
            bucket: tone_core::Bucket::Alert,
            term: "shut up".to_string(),
            kind: "phrase".to_string(),
            start: 0,
            end: 7,
            weight: 0.9,
        }];
        let out = score("thank you, now shut up", &patterns, &hits, &features);
        assert!(!out.signals.iter().any(|s| s == "compliment_veto"));
    }
}
