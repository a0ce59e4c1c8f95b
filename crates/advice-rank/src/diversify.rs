//! Duplicate-penalty (step 6), NLI signal shaping (step 8), and
//! category-guard + MMR diversification (step 9) (spec §4.12).

use std::collections::HashSet;
use tone_core::AdviceItem;

const DUPLICATE_SIMILARITY_THRESHOLD: f64 = 0.3;
const DUPLICATE_PENALTY_MULTIPLIER: f64 = 0.5;

const NLI_SHAPING_FLAP_GUARD: f64 = 0.05;
const NLI_SHAPING_CLAMP: (f64, f64) = (-0.4, 0.4);

/// Jaccard similarity over ≥3-char-word sets (spec §4.12 step 6; reuses
/// `AdviceItem::word_set()` from tone-core).
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Subtract a similarity-proportional penalty from each item's score based
/// on its highest-similarity higher-scored neighbor, given `scored` already
/// provisionally sorted score-descending (spec §4.12 step 6).
pub fn apply_duplicate_penalty(scored: &mut [(AdviceItem, f64)]) {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let word_sets: Vec<HashSet<String>> = scored.iter().map(|(item, _)| item.word_set()).collect();

    let mut penalties = vec![0.0; scored.len()];
    for i in 0..scored.len() {
        let mut max_sim = 0.0_f64;
        for j in 0..i {
            let sim = jaccard(&word_sets[i], &word_sets[j]);
            if sim > max_sim {
                max_sim = sim;
            }
        }
        if max_sim > DUPLICATE_SIMILARITY_THRESHOLD {
            penalties[i] = DUPLICATE_PENALTY_MULTIPLIER * max_sim;
        }
    }

    for (slot, penalty) in scored.iter_mut().zip(penalties) {
        slot.1 -= penalty;
    }
}

/// Bounded NLI entail/contra signal added on top of the ranking score (spec
/// §4.12 step 8): a flapping guard skips the adjustment when the signal is
/// too small to be meaningful.
pub fn nli_signal_shaping(entail: f64, contra: f64) -> f64 {
    if (entail - contra).abs() < NLI_SHAPING_FLAP_GUARD {
        return 0.0;
    }
    (0.6 * (entail - contra)).clamp(NLI_SHAPING_CLAMP.0, NLI_SHAPING_CLAMP.1)
}

/// Deterministic final sort (spec §4.12 step 7): score desc, category asc,
/// advice length asc, id asc.
pub fn deterministic_sort(scored: &mut [(AdviceItem, f64)]) {
    scored.sort_by(|(a_item, a_score), (b_item, b_score)| {
        b_score
            .partial_cmp(a_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a_item.categories.first().cmp(&b_item.categories.first()))
            .then_with(|| a_item.advice.chars().count().cmp(&b_item.advice.chars().count()))
            .then_with(|| a_item.id.cmp(&b_item.id))
    });
}

const DEFAULT_MMR_LAMBDA: f64 = 0.7;
const DIVERSIFICATION_POOL_FACTOR: usize = 2;
const CATEGORY_DEDUPE_CAP: usize = 2;

/// Category-guard dedupe + MMR diversification (spec §4.12 step 9): takes
/// up to `max_suggestions * diversification factor` pool items and greedily
/// selects `max_suggestions` maximizing `lambda * relevance - (1-lambda) *
/// max_similarity_to_selected`, capping how many items share a category.
/// When `vectors` is `None`, novelty is skipped (similarity is always 0, so
/// selection degenerates to plain top-k by relevance) per spec §4.12 step 9.
pub fn diversify(
    scored: Vec<(AdviceItem, f64)>,
    max_suggestions: usize,
    mmr_lambda: Option<f64>,
    vectors: Option<&advice_index::AdviceIndex>,
) -> Vec<(AdviceItem, f64)> {
    let lambda = mmr_lambda.unwrap_or(DEFAULT_MMR_LAMBDA).clamp(0.0, 1.0);
    let pool_size = (max_suggestions * DIVERSIFICATION_POOL_FACTOR).max(max_suggestions);
    let pool: Vec<(AdviceItem, f64)> = scored.into_iter().take(pool_size).collect();

    let vector_of = |id: &str| -> Option<[f32; advice_index::VECTOR_DIM]> {
        vectors.and_then(|idx| idx.get_vector(id).ok()).map(|arc| *arc)
    };

    let mut selected: Vec<(AdviceItem, f64)> = Vec::new();
    let mut selected_vectors: Vec<[f32; advice_index::VECTOR_DIM]> = Vec::new();
    let mut category_counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut remaining: Vec<(AdviceItem, f64)> = pool;

    while selected.len() < max_suggestions && !remaining.is_empty() {
        let mut best_idx = None;
        let mut best_mmr = f64::NEG_INFINITY;

        for (idx, (item, relevance)) in remaining.iter().enumerate() {
            let over_cap = item
                .categories
                .iter()
                .any(|c| category_counts.get(c).copied().unwrap_or(0) >= CATEGORY_DEDUPE_CAP);
            if over_cap && !selected.is_empty() {
                continue;
            }

            let novelty_penalty = if selected_vectors.is_empty() {
                0.0
            } else if let Some(v) = vector_of(&item.id) {
                selected_vectors
                    .iter()
                    .map(|sv| advice_index::cosine_similarity(&v, sv) as f64)
                    .fold(f64::NEG_INFINITY, f64::max)
                    .max(0.0)
            } else {
                0.0
            };

            let mmr = lambda * relevance - (1.0 - lambda) * novelty_penalty;
            if mmr > best_mmr {
                best_mmr = mmr;
                best_idx = Some(idx);
            }
        }

        let Some(idx) = best_idx else {
            break;
        };
        let (item, score) = remaining.remove(idx);
        for c in &item.categories {
            *category_counts.entry(c.clone()).or_insert(0) += 1;
        }
        if let Some(v) = vector_of(&item.id) {
            selected_vectors.push(v);
        }
        selected.push((item, score));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tone_core::Bucket;

    fn item(id: &str, advice: &str, categories: Vec<&str>) -> AdviceItem {
        AdviceItem {
            id: id.to_string(),
            advice: advice.to_string(),
            trigger_tone: Bucket::Caution,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: HashMap::new(),
            categories: categories.into_iter().map(String::from).collect(),
            intents: vec![],
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
    fn near_duplicate_gets_penalized() {
        let mut scored = vec![
            (item("a", "take a breath and name the feeling before reacting", vec![]), 1.0),
            (item("b", "take a breath and name the feeling before responding", vec![]), 0.9),
        ];
        apply_duplicate_penalty(&mut scored);
        let b = scored.iter().find(|(i, _)| i.id == "b").unwrap();
        assert!(b.1 < 0.9);
    }

    #[test]
    fn nli_shaping_respects_flap_guard() {
        assert_eq!(nli_signal_shaping(0.52, 0.50), 0.0);
        assert!(nli_signal_shaping(0.9, 0.05) > 0.0);
        assert!(nli_signal_shaping(0.1, 0.8) < 0.0);
    }

    #[test]
    fn deterministic_sort_breaks_ties_by_id() {
        let mut scored = vec![
            (item("b", "short", vec!["x"]), 1.0),
            (item("a", "short", vec!["x"]), 1.0),
        ];
        deterministic_sort(&mut scored);
        assert_eq!(scored[0].0.id, "a");
    }

    #[test]
    fn diversify_without_vectors_falls_back_to_top_k() {
        let scored = vec![
            (item("a", "a", vec!["x"]), 1.0),
            (item("b", "b", vec!["y"]), 0.9),
            (item("c", "c", vec!["z"]), 0.8),
        ];
        let selected = diversify(scored, 2, None, None);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].0.id, "a");
        assert_eq!(selected[1].0.id, "b");
    }

    #[test]
    fn category_cap_skips_overrepresented_category() {
        let scored = vec![
            (item("a", "a", vec!["x"]), 1.0),
            (item("b", "b", vec!["x"]), 0.95),
            (item("c", "c", vec!["x"]), 0.9),
            (item("d", "d", vec!["y"]), 0.5),
        ];
        let selected = diversify(scored, 3, None, None);
        let x_count = selected.iter().filter(|(i, _)| i.categories.contains(&"x".to_string())).count();
        assert!(x_count <= CATEGORY_DEDUPE_CAP);
    }
}
