//! Rules-only backstop (spec §4.11): consulted whenever the NLI model is
//! disabled/unavailable/times out, so a fail-open verdict still carries an
//! explainable reason instead of a bare "ok:true".
//!
//! Precedence: intent overlap (negation-aware) > spaCy-context exact match
//! with score ≥ 0.3 > sentiment↔category alignment > ≥2-word keyword
//! overlap.

use tone_core::{AdviceItem, CompactDoc};

/// Intents whose positive valence shouldn't count as a match once the
/// premise carries heavy negation (spec §4.11: "positive intents disabled
/// under heavy negation scopes > 2").
const POSITIVE_INTENTS: &[&str] = &[
    "express_gratitude",
    "express_love",
    "express_commitment",
    "express_hope",
    "express_pride",
    "reassure",
    "offer_support",
];

const HEAVY_NEGATION_SCOPES: usize = 2;

const CONTEXT_EXACT_MATCH_MIN_SCORE: f64 = 0.3;

/// Coarse classification→category hints for the sentiment↔category
/// alignment rule (spec §4.11 step 3): a hand-maintained mapping, not a
/// learned association.
const CLASSIFICATION_CATEGORY_HINTS: &[(&str, &[&str])] = &[
    ("angry", &["de-escalation", "conflict", "boundary-setting"]),
    ("frustrated", &["de-escalation", "conflict"]),
    ("anxious", &["reassurance", "grounding", "comfort"]),
    ("sad", &["comfort", "validation"]),
    ("supportive", &["connection", "appreciation"]),
    ("positive", &["connection", "appreciation"]),
    ("assertive", &["boundary-setting", "clarity"]),
    ("neutral", &["clarity", "check-in"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackstopReason {
    IntentOverlap,
    ContextExactMatch,
    SentimentCategoryAlignment,
    KeywordOverlap,
    NoMatch,
}

impl BackstopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackstopReason::IntentOverlap => "rules_intent_overlap",
            BackstopReason::ContextExactMatch => "rules_context_exact_match",
            BackstopReason::SentimentCategoryAlignment => "rules_sentiment_category_alignment",
            BackstopReason::KeywordOverlap => "rules_keyword_overlap",
            BackstopReason::NoMatch => "rules_no_match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackstopVerdict {
    pub ok: bool,
    pub reason: BackstopReason,
}

fn intent_overlap(doc: &CompactDoc, item: &AdviceItem, user_intents: &[String]) -> bool {
    if user_intents.is_empty() || item.intents.is_empty() {
        return false;
    }
    let heavy_negation = doc.neg_scopes.len() > HEAVY_NEGATION_SCOPES;
    user_intents.iter().any(|intent| {
        if heavy_negation && POSITIVE_INTENTS.contains(&intent.as_str()) {
            return false;
        }
        item.intents.iter().any(|i| i == intent)
    })
}

fn context_exact_match(doc: &CompactDoc, item: &AdviceItem) -> bool {
    if item.contexts.is_empty() {
        return false;
    }
    doc.context.score >= CONTEXT_EXACT_MATCH_MIN_SCORE && item.contexts.iter().any(|c| c == &doc.context.label)
}

fn sentiment_category_alignment(classification: &str, item: &AdviceItem) -> bool {
    CLASSIFICATION_CATEGORY_HINTS
        .iter()
        .find(|(label, _)| *label == classification)
        .map(|(_, categories)| categories.iter().any(|c| item.categories.iter().any(|ic| ic == c)))
        .unwrap_or(false)
}

fn keyword_overlap(text_lower: &str, item: &AdviceItem) -> bool {
    let text_words: std::collections::HashSet<&str> = text_lower.split_whitespace().collect();
    item.keywords
        .iter()
        .filter(|k| text_words.contains(k.to_lowercase().as_str()))
        .count()
        >= 2
}

/// Evaluate the backstop precedence chain, returning the first rule that
/// fires (or `NoMatch` / `ok:false` if none do).
pub fn evaluate(text: &str, doc: &CompactDoc, classification: &str, item: &AdviceItem, user_intents: &[String]) -> BackstopVerdict {
    if intent_overlap(doc, item, user_intents) {
        return BackstopVerdict { ok: true, reason: BackstopReason::IntentOverlap };
    }
    if context_exact_match(doc, item) {
        return BackstopVerdict { ok: true, reason: BackstopReason::ContextExactMatch };
    }
    if sentiment_category_alignment(classification, item) {
        return BackstopVerdict { ok: true, reason: BackstopReason::SentimentCategoryAlignment };
    }
    let text_lower = text.to_lowercase();
    if keyword_overlap(&text_lower, item) {
        return BackstopVerdict { ok: true, reason: BackstopReason::KeywordOverlap };
    }
    BackstopVerdict { ok: false, reason: BackstopReason::NoMatch }
}
