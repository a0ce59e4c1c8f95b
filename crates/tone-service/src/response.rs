//! `ToneResponse` — the public shape of `analyzeTone` (spec §6).
//!
//! The emotion/linguistic-feature naming here doesn't line up 1:1 with the
//! internal `EmotionScores`/`FeatureSet` channels (spec §3's internal
//! `{neutral,positive,supportive,anxious,angry,frustrated,sad,assertive}`
//! vs. the external `{joy,anger,fear,sadness,analytical,confident,
//! tentative}`); this module is the one place that translation happens, so
//! the mapping stays in one spot instead of leaking into the scorer.

use serde::{Deserialize, Serialize};
use tone_core::{AttachmentEstimate, Bucket, BucketDist, CompactDoc, ToneScore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneLabel {
    pub classification: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Emotions {
    pub joy: f64,
    pub anger: f64,
    pub fear: f64,
    pub sadness: f64,
    pub analytical: f64,
    pub confident: f64,
    pub tentative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticFeatures {
    pub formality_level: f64,
    pub emotional_complexity: f64,
    pub assertiveness: f64,
    pub empathy_indicators: Vec<String>,
    pub potential_misunderstandings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipImpact {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub appropriateness_score: f64,
    pub relationship_impact: RelationshipImpact,
    pub suggested_adjustments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentInsights {
    pub primary: String,
    pub secondary: Option<String>,
    pub confidence: f64,
    /// `true` when this attachment style remapped the raw bucket toward a
    /// different UI bucket than an equal-weight `secure` user would see
    /// (spec §4.12 "attachment-aware tone matching").
    pub remapped_bucket: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneResponse {
    pub tone: ToneLabel,
    pub emotions: Emotions,
    pub intensity: f64,
    pub sentiment_score: f64,
    pub linguistic_features: LinguisticFeatures,
    pub context_analysis: ContextAnalysis,
    pub attachment_insights: Option<AttachmentInsights>,
    pub ui_tone: Bucket,
    pub ui_distribution: BucketDist,
}

/// Translate the internal eight-channel emotion distribution into the
/// external seven-channel one. `analytical`/`confident`/`tentative` have no
/// exact internal counterpart; they're read off `neutral`/`assertive` and a
/// supportive/anxious hedge blend respectively (spec §9 Open Question: an
/// implementer-decided derived mapping, recorded in DESIGN.md).
fn map_emotions(score: &ToneScore) -> Emotions {
    // `score.scores` is already softmax-normalized by `tone_score::scorer::score`.
    let s = score.scores;
    Emotions {
        joy: s.positive,
        anger: s.angry,
        fear: s.anxious,
        sadness: s.sad,
        analytical: s.neutral,
        confident: s.assertive,
        tentative: (s.supportive * 0.3 + s.anxious * 0.3).min(1.0),
    }
}

/// `[-1, 1]`: net of the "warm" channels against the "hostile/distressed"
/// ones, over the softmaxed distribution.
fn sentiment_score(score: &ToneScore) -> f64 {
    let s = score.scores;
    let warm = s.positive + s.supportive;
    let cold = s.angry + s.frustrated + s.sad + s.anxious;
    (warm - cold).clamp(-1.0, 1.0)
}

/// Contraction ratio as a cheap formality proxy: formal text rarely
/// contracts "is not" to "isn't".
fn formality_level(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let word_count = lower.split_whitespace().count().max(1) as f64;
    let contractions = ["n't", "'re", "'ve", "'ll", "'d", "'m"];
    let contraction_hits = contractions.iter().filter(|c| lower.contains(*c)).count() as f64;
    (1.0 - (contraction_hits / word_count).min(1.0)).clamp(0.0, 1.0)
}

/// Fraction of the eight emotion channels carrying non-trivial mass: a
/// single dominant emotion reads as "simple", several co-active channels
/// read as emotionally complex.
fn emotional_complexity(score: &ToneScore) -> f64 {
    let s = score.scores;
    let active = [s.neutral, s.positive, s.supportive, s.anxious, s.angry, s.frustrated, s.sad, s.assertive]
        .iter()
        .filter(|v| **v > 0.12)
        .count();
    (active as f64 / 8.0).clamp(0.0, 1.0)
}

fn empathy_indicators(doc: &CompactDoc, signals: &[String]) -> Vec<String> {
    let mut out: Vec<String> = doc
        .phrase_edges
        .iter()
        .filter(|e| e.category.to_lowercase().contains("empath") || e.category.to_lowercase().contains("support"))
        .map(|e| e.category.clone())
        .collect();
    out.extend(signals.iter().filter(|s| s.contains("supportive")).cloned());
    out.sort();
    out.dedup();
    out
}

fn potential_misunderstandings(doc: &CompactDoc) -> Vec<String> {
    let mut out = Vec::new();
    if doc.sarcasm.present {
        out.push("sarcasm detected; the literal words may read more calmly than intended".to_string());
    }
    if doc.has_negation() {
        out.push("negation present; the statement may be easy to misread by flipping the negated clause".to_string());
    }
    if doc.second_person_count() >= 3 {
        out.push("heavy direct address; the message may land as more pointed than intended".to_string());
    }
    out
}

fn relationship_impact(primary: Bucket) -> RelationshipImpact {
    match primary {
        Bucket::Clear => RelationshipImpact::Positive,
        Bucket::Caution => RelationshipImpact::Neutral,
        Bucket::Alert => RelationshipImpact::Negative,
    }
}

fn suggested_adjustments(primary: Bucket, explanation: &[String]) -> Vec<String> {
    if primary == Bucket::Clear {
        return Vec::new();
    }
    explanation.to_vec()
}

/// Assemble the public `ToneResponse` from the internal pipeline outputs.
#[allow(clippy::too_many_arguments)]
pub fn build(
    classification: &str,
    score: &ToneScore,
    dist: BucketDist,
    confidence: f64,
    text: &str,
    doc: &CompactDoc,
    context_confidence: f64,
    attachment: Option<&AttachmentEstimate>,
    attachment_style: &str,
    raw_primary_before_attachment: Bucket,
) -> ToneResponse {
    let emotions = map_emotions(score);
    let linguistic_features = LinguisticFeatures {
        formality_level: formality_level(text),
        emotional_complexity: emotional_complexity(score),
        assertiveness: emotions.confident,
        empathy_indicators: empathy_indicators(doc, &score.signals),
        potential_misunderstandings: potential_misunderstandings(doc),
    };
    let context_analysis = ContextAnalysis {
        appropriateness_score: context_confidence,
        relationship_impact: relationship_impact(dist.primary),
        suggested_adjustments: suggested_adjustments(dist.primary, &score.explanation),
    };
    let attachment_insights = attachment.map(|est| AttachmentInsights {
        primary: est.primary.as_str().to_string(),
        secondary: est.secondary.map(|s| s.as_str().to_string()),
        confidence: est.confidence,
        remapped_bucket: dist.primary != raw_primary_before_attachment,
    });

    ToneResponse {
        tone: ToneLabel {
            classification: classification.to_string(),
            confidence,
        },
        emotions,
        intensity: score.intensity.clamp(0.0, 1.0),
        sentiment_score: sentiment_score(score),
        linguistic_features,
        context_analysis,
        attachment_insights,
        ui_tone: dist.primary,
        ui_distribution: dist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_core::{EmotionScores, MetaClassifier};

    fn score() -> ToneScore {
        let mut scores = EmotionScores::default();
        scores.add("angry", 2.0);
        scores.add("neutral", 0.2);
        ToneScore {
            scores,
            intensity: 0.6,
            confidence: 0.7,
            meta_classifier: MetaClassifier { p_alert: 0.7, p_caution: 0.2 },
            signals: vec!["trigger:alert:shut up".to_string()],
            explanation: vec!["signal(s) contributed".to_string()],
            classification: "angry".to_string(),
        }
    }

    #[test]
    fn build_produces_normalized_emotions_and_matching_primary() {
        let s = score();
        let doc = CompactDoc::fallback("you never listen to me, shut up");
        let dist = BucketDist::from_raw(0.1, 0.2, 0.7);
        let resp = build("angry", &s, dist, 0.8, "you never listen to me, shut up", &doc, 0.5, None, "secure", Bucket::Alert);
        assert_eq!(resp.ui_tone, Bucket::Alert);
        assert!(resp.emotions.anger > resp.emotions.joy);
        assert_eq!(resp.context_analysis.relationship_impact, RelationshipImpact::Negative);
    }

    #[test]
    fn clear_bucket_has_no_suggested_adjustments() {
        let s = score();
        let doc = CompactDoc::fallback("thank you so much");
        let dist = BucketDist::from_raw(0.9, 0.05, 0.05);
        let resp = build("positive", &s, dist, 0.8, "thank you so much", &doc, 0.9, None, "secure", Bucket::Clear);
        assert!(resp.context_analysis.suggested_adjustments.is_empty());
    }
}
