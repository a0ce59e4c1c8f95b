//! A single trigger-word hit (spec §4.2: `(bucket, term, type, start, end,
//! weight)`).

use tone_core::Bucket;

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerHit {
    pub bucket: Bucket,
    pub term: String,
    pub kind: String,
    pub start: usize,
    pub end: usize,
    /// Base intensity from the config record, already scaled by any
    /// per-context multiplier (spec §4.2 step 4).
    pub weight: f64,
}

/// Drop hits fully contained within a longer hit over the same bucket,
/// keeping the longest, highest-weight match per overlapping cluster
/// (spec §4.2: "longest match wins; ties keep the higher-weight term").
pub fn dedupe(mut hits: Vec<TriggerHit>) -> Vec<TriggerHit> {
    hits.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
            .then(b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut kept: Vec<TriggerHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        let contained = kept.iter().any(|k| {
            k.bucket == hit.bucket && k.start <= hit.start && hit.end <= k.end
        });
        if !contained {
            kept.push(hit);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(bucket: Bucket, start: usize, end: usize, weight: f64) -> TriggerHit {
        TriggerHit {
            bucket,
            term: "x".into(),
            kind: "phrase".into(),
            start,
            end,
            weight,
        }
    }

    #[test]
    fn dedupe_drops_contained_shorter_hit() {
        let hits = vec![hit(Bucket::Alert, 0, 10, 0.5), hit(Bucket::Alert, 2, 5, 0.9)];
        let kept = dedupe(hits);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start, 0);
        assert_eq!(kept[0].end, 10);
    }

    #[test]
    fn dedupe_keeps_non_overlapping_hits() {
        let hits = vec![hit(Bucket::Alert, 0, 3, 0.5), hit(Bucket::Caution, 5, 8, 0.4)];
        let kept = dedupe(hits);
        assert_eq!(kept.len(), 2);
    }
}
