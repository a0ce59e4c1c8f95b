//! C5 FeatureExtractor: projects a `CompactDoc` plus the intensity pass
//! into the flat numeric feature set `ToneScorer`'s meta-classifier
//! consumes (spec §4.5).

use crate::intensity::{self, IntensityHit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tone_core::CompactDoc;

/// The 12-feature vector feeding the logistic meta-classifier (spec §4.6
/// step 3: "a small logistic model over interpretable features, not a
/// learned embedding").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub token_count: f64,
    pub sentence_count: f64,
    pub negation_scope_count: f64,
    pub negation_ratio: f64,
    pub second_person_count: f64,
    pub second_person_ratio: f64,
    pub sarcasm_score: f64,
    pub context_confidence: f64,
    pub intensity_multiplier: f64,
    pub phrase_edge_total_weight: f64,
    pub phrase_edge_category_count: f64,
    pub exclamation_ratio: f64,
    /// Per-category phrase-edge weight totals, carried alongside the flat
    /// vector for detectors that want the breakdown (not part of the 12
    /// scalar inputs themselves).
    pub phrase_edge_by_category: HashMap<String, f64>,
}

impl FeatureSet {
    /// The 12 scalar inputs to the meta-classifier, in a fixed order
    /// (spec §4.6 step 3). Keep this order in sync with the weight vector
    /// tone-score's meta-classifier is trained/configured against.
    pub fn as_vector(&self) -> [f64; 12] {
        [
            self.token_count,
            self.sentence_count,
            self.negation_scope_count,
            self.negation_ratio,
            self.second_person_count,
            self.second_person_ratio,
            self.sarcasm_score,
            self.context_confidence,
            self.intensity_multiplier,
            self.phrase_edge_total_weight,
            self.phrase_edge_category_count,
            self.exclamation_ratio,
        ]
    }
}

pub fn extract(doc: &CompactDoc, intensity_hits: &[IntensityHit], text: &str) -> FeatureSet {
    let token_count = doc.tokens.len().max(1) as f64;
    let sentence_count = doc.sents.len().max(1) as f64;
    let negation_scope_count = doc.neg_scopes.len() as f64;
    let second_person_count = doc.second_person_count() as f64;
    let exclamation_count = text.chars().filter(|c| *c == '!').count() as f64;

    let mut phrase_edge_by_category: HashMap<String, f64> = HashMap::new();
    let mut phrase_edge_total_weight = 0.0;
    for edge in &doc.phrase_edges {
        phrase_edge_total_weight += edge.weight;
        *phrase_edge_by_category.entry(edge.category.clone()).or_insert(0.0) += edge.weight;
    }

    FeatureSet {
        token_count,
        sentence_count,
        negation_scope_count,
        negation_ratio: negation_scope_count / token_count,
        second_person_count,
        second_person_ratio: second_person_count / token_count,
        sarcasm_score: doc.sarcasm.score,
        context_confidence: doc.context.confidence,
        intensity_multiplier: intensity::aggregate_multiplier(intensity_hits),
        phrase_edge_total_weight,
        phrase_edge_category_count: phrase_edge_by_category.len() as f64,
        exclamation_ratio: exclamation_count / token_count,
        phrase_edge_by_category,
    }
}
