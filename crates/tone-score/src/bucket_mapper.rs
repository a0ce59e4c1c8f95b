//! C7 BucketMapper: base bucket + context/attachment override stack + a
//! guard pass, turning `ToneScore`'s meta-classifier probabilities and
//! emotion distribution into the final `BucketDist` (spec §4.7).

use tone_config::{BucketTriple, EligibilityConfig, ToneBucketMapping};
use tone_core::{Bucket, BucketDist, MetaClassifier};
use tone_match::TriggerHit;

fn triple_to_parts(t: &BucketTriple) -> (f64, f64, f64) {
    (t.clear, t.caution, t.alert)
}

/// Merge semantics for every override layer (spec.md §9 Open Question:
/// "delta when both the base and the override name the same bucket").
pub fn merge_deltas(base: (f64, f64, f64), delta: &BucketTriple) -> (f64, f64, f64) {
    (base.0 + delta.clear, base.1 + delta.caution, base.2 + delta.alert)
}

/// Base distribution purely from the meta-classifier + emotion argmax
/// label's configured base triple, with **no** context/attachment/
/// intensity overrides applied (spec.md §9 Open Question decision #1: a
/// distinct, explicit entry point, never the implicit default).
pub fn map_pure_base(classification: &str, meta: &MetaClassifier, mapping: &ToneBucketMapping) -> BucketDist {
    let base = mapping
        .tone_buckets
        .get(classification)
        .map(|entry| triple_to_parts(&entry.base))
        .unwrap_or((meta.p_alert.mul_add(-1.0, 1.0) - meta.p_caution, meta.p_caution, meta.p_alert));
    BucketDist::from_raw(base.0, base.1, base.2)
}

/// Full mapping: base + context override + attachment override + intensity
/// shift, each merged with delta-when-both-present semantics, then
/// normalized (spec §4.7).
pub fn map(
    classification: &str,
    meta: &MetaClassifier,
    intensity: f64,
    context: &str,
    attachment_style: &str,
    mapping: &ToneBucketMapping,
) -> BucketDist {
    let mut parts = mapping
        .tone_buckets
        .get(classification)
        .map(|entry| triple_to_parts(&entry.base))
        .unwrap_or((meta.p_alert.mul_add(-1.0, 1.0) - meta.p_caution, meta.p_caution, meta.p_alert));

    if let Some(by_label) = mapping.context_overrides.get(context) {
        if let Some(delta) = by_label.get(classification) {
            parts = merge_deltas(parts, delta);
        }
    }

    if let Some(by_label) = mapping.attachment_overrides.get(attachment_style) {
        if let Some(delta) = by_label.get(classification) {
            parts = merge_deltas(parts, delta);
        }
    }

    let (lo, hi) = mapping.intensity_shifts.thresholds;
    let shift = if intensity < lo {
        &mapping.intensity_shifts.low
    } else if intensity < hi {
        &mapping.intensity_shifts.med
    } else {
        &mapping.intensity_shifts.high
    };
    parts = merge_deltas(parts, shift);

    BucketDist::from_raw(parts.0, parts.1, parts.2)
}

/// Post-mapping guardrail: never let `alert` fall below the configured
/// per-bucket guard threshold when the raw meta-classifier strongly
/// disagrees with the mapped distribution (spec §4.7 step 5: "a guard
/// pass that can only push a message *toward* caution/alert, never away
/// from it").
pub fn apply_guard(mut dist: BucketDist, meta: &MetaClassifier, guard_thresholds: &std::collections::HashMap<String, f64>) -> BucketDist {
    let alert_guard = guard_thresholds.get("alert").copied().unwrap_or(0.0);
    if meta.p_alert >= alert_guard && meta.p_alert > dist.alert {
        dist.set(Bucket::Alert, meta.p_alert);
        dist.normalize();
        dist.refresh_primary();
    }
    dist
}

/// Default thresholds for the eligibility guards (spec §4.7 step 7) when
/// `contextClassifier.engine.guard_thresholds` doesn't name them explicitly.
const DEFAULT_OVERSHADOW_ALERT_MIN: f64 = 0.2;
const DEFAULT_OVERSHADOW_RATIO: f64 = 0.5;
const DEFAULT_PREFER_CAUTION_THRESHOLD: f64 = 0.18;

fn guard(guard_thresholds: &std::collections::HashMap<String, f64>, key: &str, default: f64) -> f64 {
    guard_thresholds.get(key).copied().unwrap_or(default)
}

/// Eligibility guards for the `clear` bucket (spec §4.7 step 7):
///
/// - if `clear`'s only evidence is generic/excluded tokens, cap it near zero;
/// - *overshadow*: a strong `alert` signal caps `clear` to a fraction of it;
/// - *prefer-caution*: when both `clear` and `alert` clear a threshold,
///   bleed a little `clear` mass into `caution` rather than let them coexist.
///
/// Only runs when `classification`'s config entry declares an
/// `eligibility` block; otherwise `dist` passes through untouched.
pub fn apply_eligibility_guards(
    mut dist: BucketDist,
    classification: &str,
    mapping: &ToneBucketMapping,
    clear_bucket_hits: &[TriggerHit],
    guard_thresholds: &std::collections::HashMap<String, f64>,
) -> BucketDist {
    let eligibility: Option<&EligibilityConfig> = mapping
        .tone_buckets
        .get(classification)
        .and_then(|e| e.eligibility.as_ref());

    if let Some(elig) = eligibility {
        if elig.require_phrase_level || elig.min_ngram.is_some() || !elig.exclude_tokens.is_empty() {
            let only_excluded = clear_bucket_hits.is_empty()
                || clear_bucket_hits
                    .iter()
                    .all(|h| elig.exclude_tokens.iter().any(|t| t == &h.term));
            if only_excluded {
                dist.clear = dist.clear.min(0.01);
                dist.normalize();
                dist.refresh_primary();
            }
        }
    }

    let overshadow_min = guard(guard_thresholds, "overshadow_alert_min", DEFAULT_OVERSHADOW_ALERT_MIN);
    let overshadow_ratio = guard(guard_thresholds, "overshadow_ratio", DEFAULT_OVERSHADOW_RATIO);
    if dist.alert >= overshadow_min && dist.clear < dist.alert * overshadow_ratio {
        dist.clear = dist.clear.min(dist.alert * 0.25);
        dist.normalize();
        dist.refresh_primary();
    }

    let prefer_caution_threshold = guard(
        guard_thresholds,
        "prefer_caution_threshold",
        DEFAULT_PREFER_CAUTION_THRESHOLD,
    );
    if dist.clear > prefer_caution_threshold && dist.alert > prefer_caution_threshold {
        let bleed = (0.15_f64).min(dist.clear * 0.25);
        dist.clear -= bleed;
        dist.caution += bleed;
        dist.normalize();
        dist.refresh_primary();
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::{BaseBucketEntry, IntensityShiftConfig};
    use std::collections::HashMap;

    fn mapping() -> ToneBucketMapping {
        let mut tone_buckets = HashMap::new();
        tone_buckets.insert(
            "angry".to_string(),
            BaseBucketEntry {
                base: BucketTriple { clear: 0.1, caution: 0.3, alert: 0.6 },
                eligibility: None,
            },
        );
        ToneBucketMapping {
            tone_buckets,
            context_overrides: HashMap::new(),
            intensity_shifts: IntensityShiftConfig {
                thresholds: (0.3, 0.7),
                low: BucketTriple::default(),
                med: BucketTriple::default(),
                high: BucketTriple { clear: -0.1, caution: 0.0, alert: 0.1 },
            },
            attachment_overrides: HashMap::new(),
            default_bucket: "clear".to_string(),
        }
    }

    #[test]
    fn map_applies_intensity_shift_at_high_band() {
        let meta = MetaClassifier { p_alert: 0.6, p_caution: 0.3 };
        let dist = map("angry", &meta, 0.9, "general", "secure", &mapping());
        assert!(dist.alert > 0.0);
        assert!(dist.is_normalized());
    }

    #[test]
    fn pure_base_ignores_overrides() {
        let meta = MetaClassifier { p_alert: 0.6, p_caution: 0.3 };
        let dist = map_pure_base("angry", &meta, &mapping());
        assert!(dist.is_normalized());
    }

    #[test]
    fn guard_pushes_alert_up_never_down() {
        let meta = MetaClassifier { p_alert: 0.9, p_caution: 0.1 };
        let mut thresholds = HashMap::new();
        thresholds.insert("alert".to_string(), 0.5);
        let base = BucketDist::from_raw(0.8, 0.1, 0.1);
        let guarded = apply_guard(base, &meta, &thresholds);
        assert!(guarded.alert >= base.alert);
    }

    fn mapping_with_clear_eligibility() -> ToneBucketMapping {
        let mut tone_buckets = HashMap::new();
        tone_buckets.insert(
            "neutral".to_string(),
            BaseBucketEntry {
                base: BucketTriple { clear: 0.6, caution: 0.3, alert: 0.1 },
                eligibility: Some(tone_config::EligibilityConfig {
                    require_phrase_level: false,
                    min_ngram: None,
                    exclude_tokens: vec!["ok".to_string(), "fine".to_string()],
                }),
            },
        );
        ToneBucketMapping {
            tone_buckets,
            ..Default::default()
        }
    }

    fn hit(term: &str) -> TriggerHit {
        TriggerHit {
            bucket: tone_core::Bucket::Clear,
            term: term.to_string(),
            kind: "phrase".to_string(),
            start: 0,
            end: term.len(),
            weight: 0.3,
        }
    }

    #[test]
    fn eligibility_caps_clear_when_only_excluded_tokens_fired() {
        let dist = BucketDist::from_raw(0.6, 0.3, 0.1);
        let guarded = apply_eligibility_guards(
            dist,
            "neutral",
            &mapping_with_clear_eligibility(),
            &[hit("ok"), hit("fine")],
            &HashMap::new(),
        );
        assert!(guarded.clear <= 0.011);
    }

    #[test]
    fn eligibility_leaves_clear_when_specific_evidence_fired() {
        let dist = BucketDist::from_raw(0.6, 0.3, 0.1);
        let guarded = apply_eligibility_guards(
            dist,
            "neutral",
            &mapping_with_clear_eligibility(),
            &[hit("thank you so much")],
            &HashMap::new(),
        );
        assert!(guarded.clear > 0.1);
    }

    #[test]
    fn overshadow_rule_caps_clear_when_alert_dominates() {
        let dist = BucketDist::from_raw(0.25, 0.15, 0.6);
        let guarded = apply_eligibility_guards(
            dist,
            "angry",
            &mapping(),
            &[],
            &HashMap::new(),
        );
        assert!(guarded.clear <= 0.6 * 0.25 + 1e-9);
    }

    #[test]
    fn prefer_caution_bleeds_clear_into_caution() {
        let dist = BucketDist::from_raw(0.4, 0.05, 0.4);
        let guarded = apply_eligibility_guards(
            dist,
            "angry",
            &mapping(),
            &[],
            &HashMap::new(),
        );
        assert!(guarded.caution > dist.caution);
    }
}
