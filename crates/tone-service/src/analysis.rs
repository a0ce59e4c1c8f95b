//! C3-C8 orchestration (spec §4.3-§4.8): the fixed pipeline `analyzeTone`
//! and `generateAdvancedSuggestions` both start from —
//! `LocalNlp::analyze` -> intensity detection -> `FeatureExtractor` ->
//! `TokenScanner::scan` -> `ToneScorer::score` -> `BucketMapper` (base +
//! overrides + guards) -> `Calibrator`.
//!
//! Stages run in the documented order (spec §5: "no two stages mutate the
//! same record concurrently"); nothing here suspends, so callers may run
//! this on a blocking thread or inline in an async handler.

use tone_core::{Bucket, BucketDist, CompactDoc, ToneScore};

/// Everything downstream (`analyzeTone`'s response builder, and
/// `generateAdvancedSuggestions`'s candidate pool / ranker) needs from one
/// scoring pass, bundled so a caller that already ran analysis doesn't pay
/// for it twice (spec §4.13: `fullToneAnalysis` is accepted, not
/// recomputed).
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub doc: CompactDoc,
    pub score: ToneScore,
    pub dist: BucketDist,
    pub confidence: f64,
    pub context_confidence: f64,
    /// The bucket a `secure`-attachment user would have landed on, used
    /// only to detect whether `attachment_style` remapped the primary
    /// bucket (spec §4.12 attachment-aware matching note).
    pub raw_primary_before_attachment: Bucket,
}

/// Run the full C3-C8 pipeline over `text` (spec §4.3-§4.8).
pub fn run(
    text: &str,
    context: &str,
    attachment_style: &str,
    is_new_user: bool,
    config: &tone_config::ConfigProvider,
    nlp: &tone_nlp::LocalNlp,
    scanner: &tone_match::TokenScanner,
) -> AnalysisOutcome {
    let doc = nlp.analyze(text, config);

    let compiled_intensity = tone_nlp::intensity::compile(config.intensity_modifiers());
    let intensity_hits = tone_nlp::intensity::detect(&doc.tokens, &compiled_intensity);
    let features = tone_nlp::extract_features(&doc, &intensity_hits, text);

    let trigger_hits = scanner.scan(text, context, config.tone_trigger_words());
    let score = tone_score::scorer::score(text, config.tone_patterns(), &trigger_hits, &features);

    let mapping = config.tone_bucket_mapping();
    let guard_thresholds = &config.context_classifier().engine.guard_thresholds;

    let raw_primary_before_attachment = if attachment_style == "secure" {
        None
    } else {
        Some(
            tone_score::bucket_mapper::map(&score.classification, &score.meta_classifier, score.intensity, context, "secure", mapping)
                .primary,
        )
    };

    let mut dist = tone_score::bucket_mapper::map(
        &score.classification,
        &score.meta_classifier,
        score.intensity,
        context,
        attachment_style,
        mapping,
    );
    dist = tone_score::bucket_mapper::apply_guard(dist, &score.meta_classifier, guard_thresholds);

    let clear_hits: Vec<_> = trigger_hits.iter().filter(|h| h.bucket == Bucket::Clear).cloned().collect();
    dist = tone_score::bucket_mapper::apply_eligibility_guards(dist, &score.classification, mapping, &clear_hits, guard_thresholds);

    let raw_primary_before_attachment = raw_primary_before_attachment.unwrap_or(dist.primary);

    let calibrated = tone_score::calibrator::calibrate(score.confidence, context, config.evaluation_tones(), config.learning_signals());
    let floored = tone_score::calibrator::apply_confidence_floor(calibrated, context, config.evaluation_tones());
    let confidence = tone_score::calibrator::apply_new_user_discount(floored, is_new_user);

    AnalysisOutcome {
        context_confidence: doc.context.confidence,
        doc,
        score,
        dist,
        confidence,
        raw_primary_before_attachment,
    }
}
