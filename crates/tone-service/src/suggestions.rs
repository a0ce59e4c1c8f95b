//! C10-C12 orchestration (spec §4.10-§4.12): assembles the attachment-aware
//! candidate pool from `advice-index` and hands it to `advice-rank::rank`.
//!
//! `advice_index::get_advice_candidates` only matches `item.trigger_tone ==
//! tone` exactly by design (its own doc comment defers cross-bucket
//! attachment matching here) — spec §4.12's "attachment-aware tone
//! matching rule" is a property of the *ranker*, not the index, so this
//! module queries the index once per UI bucket the current attachment
//! style is allowed to draw from and merges the result by item id.

use advice_index::AdviceIndex;
use std::collections::HashMap;
use tone_core::{AdviceItem, Bucket};
use tone_score::AttachmentToneMap;

/// Build the deduplicated candidate pool for `primary_bucket` under
/// `attachment_style`: query every bucket the attachment map says matches
/// the user's current tone, keep the max-scoring hit per item id.
pub fn candidate_pool(
    index: &AdviceIndex,
    attachment_map: &AttachmentToneMap,
    query_text: &str,
    primary_bucket: Bucket,
    context: &str,
    attachment_style: &str,
    severity_baseline: f64,
    fuzzy_expansion: bool,
) -> Vec<AdviceItem> {
    let mut best: HashMap<String, (AdviceItem, f64)> = HashMap::new();

    for bucket in Bucket::ALL {
        if !attachment_map.matches(attachment_style, primary_bucket, bucket) {
            continue;
        }
        let candidates = index.get_advice_candidates(query_text, bucket, context, attachment_style, severity_baseline, fuzzy_expansion);
        for candidate in candidates {
            best
                .entry(candidate.item.id.clone())
                .and_modify(|(existing_item, existing_score)| {
                    if candidate.score > *existing_score {
                        *existing_item = candidate.item.clone();
                        *existing_score = candidate.score;
                    }
                })
                .or_insert((candidate.item, candidate.score));
        }
    }

    let mut pool: Vec<(AdviceItem, f64)> = best.into_values().collect();
    pool.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.id.cmp(&b.0.id)));
    pool.into_iter().map(|(item, _)| item).collect()
}
