//! `getAdviceCandidates` (spec §4.10): pre-select corpus items whose
//! `triggerTone` matches the current bucket and whose `contexts` fit, then
//! score the pool as a blend of BM25, context-link bonus, pattern
//! alignment, attachment style-tuning, and a soft severity gate. Full
//! attachment-aware cross-bucket tone matching and everything downstream
//! of this pool (contraindications, NLI, MMR) lives in `advice-rank`
//! (spec §4.12).

use crate::bm25::{tokenize, Bm25Index};
use std::collections::HashMap;
use tone_core::{AdviceItem, Bucket};

const BM25_WEIGHT: f64 = 0.55;
const MAX_CONTEXT_LINK_BONUS: f64 = 0.05;
const MAX_PATTERN_ALIGNMENT: f64 = 0.15;
const SEVERITY_GATE_PENALTY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub item: AdviceItem,
    pub score: f64,
}

fn pattern_alignment(item: &AdviceItem, text_lower: &str) -> f64 {
    if item.patterns.is_empty() {
        return 0.0;
    }
    let hits = item
        .patterns
        .iter()
        .filter(|p| text_lower.contains(&p.to_lowercase()))
        .count();
    MAX_PATTERN_ALIGNMENT * (hits as f64 / item.patterns.len() as f64)
}

fn context_link_bonus(item: &AdviceItem, context: &str) -> f64 {
    if item.context_link.iter().any(|c| c == context) {
        MAX_CONTEXT_LINK_BONUS
    } else {
        0.0
    }
}

/// Preselect and score candidates for `tone`/`context`/`attachment_style`.
/// `severity_baseline` is the bucket-mass (or intensity) used against each
/// item's `severity_threshold` soft gate.
pub fn get_advice_candidates(
    items: &[AdviceItem],
    bm25: &Bm25Index,
    query_text: &str,
    tone: Bucket,
    context: &str,
    attachment_style: &str,
    severity_baseline: f64,
) -> Vec<Candidate> {
    let query_terms = tokenize(query_text);
    let bm25_scores: HashMap<String, f64> = bm25.score(&query_terms).into_iter().collect();
    let text_lower = query_text.to_lowercase();

    let mut out: Vec<Candidate> = items
        .iter()
        .filter(|item| item.trigger_tone == tone)
        .filter(|item| item.matches_context(context))
        .map(|item| {
            let bm25_component = bm25_scores.get(&item.id).copied().unwrap_or(0.0) * BM25_WEIGHT;
            let style_component = item.style_tuning.get(attachment_style).copied().unwrap_or(0.0);
            let mut score = bm25_component
                + context_link_bonus(item, context)
                + pattern_alignment(item, &text_lower)
                + style_component;

            if let Some(threshold) = item.severity_threshold_for(tone) {
                if severity_baseline < threshold {
                    score -= SEVERITY_GATE_PENALTY;
                }
            }

            Candidate {
                item: item.clone(),
                score,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
    out
}
