//! C10 AdviceIndex: the therapy-advice corpus plus its retrieval machinery
//! — BM25 scoring, prefix/fuzzy query expansion, and a lazily-populated
//! "dense" vector cache (spec §4.10).

pub mod bm25;
pub mod candidates;
pub mod error;
pub mod query_expansion;
pub mod vector;

pub use bm25::{tokenize, Bm25Index};
pub use candidates::{get_advice_candidates, Candidate};
pub use error::IndexError;
pub use query_expansion::{expand, within_distance_one, DEFAULT_PREFIX_CAP};
pub use vector::{cosine_similarity, embed, warm_up, VectorCache, VECTOR_DIM};

use std::collections::HashMap;
use tone_core::{AdviceItem, Bucket};

/// One `search()` result: a positive-scoring corpus item plus which
/// expanded query terms matched it (spec §4.10/§8 scenario 5).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
}

/// The assembled corpus index: BM25 scoring, per-term document frequency
/// (for query expansion), and the on-demand vector cache, all built once
/// from a fixed `AdviceItem` corpus (spec §4.10).
pub struct AdviceIndex {
    items: Vec<AdviceItem>,
    by_id: HashMap<String, usize>,
    bm25: Bm25Index,
    vocab_df: HashMap<String, u32>,
    vectors: VectorCache,
}

impl AdviceIndex {
    pub fn build(items: Vec<AdviceItem>) -> Result<Self, IndexError> {
        if items.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        let bm25 = Bm25Index::build(&items);
        let mut vocab_df = HashMap::new();
        for item in &items {
            for term in bm25::tokenize(&item.advice) {
                *vocab_df.entry(term).or_insert(0) += 1;
            }
        }
        let by_id = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id.clone(), idx))
            .collect();

        Ok(Self {
            items,
            by_id,
            bm25,
            vocab_df,
            vectors: VectorCache::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AdviceItem> {
        self.by_id.get(id).map(|&idx| &self.items[idx])
    }

    pub fn items(&self) -> &[AdviceItem] {
        &self.items
    }

    /// Expand every term of `query_text` against the corpus vocabulary
    /// (spec §4.10) and return the combined, deduped term list used for
    /// BM25 scoring.
    pub fn expand_query(&self, query_text: &str, fuzzy: bool) -> Vec<String> {
        let mut terms: Vec<String> = bm25::tokenize(query_text);
        let mut expanded = Vec::new();
        for term in &terms {
            expanded.extend(query_expansion::expand(term, &self.vocab_df, fuzzy, DEFAULT_PREFIX_CAP));
        }
        terms.extend(expanded);
        terms.sort();
        terms.dedup();
        terms
    }

    /// Spec §4.10/§8 scenario 5's `search`: query-expanded BM25 lookup over
    /// the whole corpus, keeping only positive-scoring hits and reporting
    /// which expanded query terms actually matched each one. Sorted score
    /// descending, id ascending on ties (`Bm25Index::score`'s own order).
    pub fn search(&self, query_text: &str, fuzzy: bool) -> Vec<SearchHit> {
        let terms = self.expand_query(query_text, fuzzy);
        self.bm25
            .score(&terms)
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .map(|(id, score)| {
                let item = self.get(&id).expect("bm25 id came from this corpus");
                let doc_terms: std::collections::HashSet<String> =
                    bm25::tokenize(&format!("{} {} {}", item.advice, item.keywords.join(" "), item.tags.join(" ")))
                        .into_iter()
                        .collect();
                let mut matched_terms: Vec<String> = terms.iter().filter(|t| doc_terms.contains(*t)).cloned().collect();
                matched_terms.sort();
                SearchHit { id, score, matched_terms }
            })
            .collect()
    }

    /// Spec §4.10's `getAdviceCandidates`: preselected, scored candidates
    /// for the given tone/context/attachment-style, query-expanded first.
    pub fn get_advice_candidates(
        &self,
        query_text: &str,
        tone: Bucket,
        context: &str,
        attachment_style: &str,
        severity_baseline: f64,
        fuzzy_expansion: bool,
    ) -> Vec<Candidate> {
        let expanded_terms = self.expand_query(query_text, fuzzy_expansion);
        let expanded_query = expanded_terms.join(" ");
        candidates::get_advice_candidates(
            &self.items,
            &self.bm25,
            &expanded_query,
            tone,
            context,
            attachment_style,
            severity_baseline,
        )
    }

    /// On-demand dense vector for a known corpus item (spec §4.10:
    /// "getVector(id) computes and caches on demand").
    pub fn get_vector(&self, id: &str) -> Result<std::sync::Arc<[f32; VECTOR_DIM]>, IndexError> {
        let item = self.get(id).ok_or_else(|| IndexError::UnknownItemId(id.to_string()))?;
        Ok(self.vectors.get_or_compute(&item.id, &item.advice))
    }

    pub async fn warm_vectors(&self, max: usize, concurrency: usize) {
        vector::warm_up(&self.vectors, &self.items, max, concurrency).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn item(id: &str, tone: Bucket) -> AdviceItem {
        AdviceItem {
            id: id.to_string(),
            advice: format!("advice {id} about naming the feeling and taking a breath"),
            trigger_tone: tone,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: Map::new(),
            categories: vec![],
            intents: vec![],
            context_link: vec![],
            patterns: vec![],
            tags: vec![],
            style_tuning: Map::new(),
            boost_sources: vec![],
            keywords: vec![],
            negation_sensitive: false,
        }
    }

    #[test]
    fn build_rejects_empty_corpus() {
        assert!(matches!(AdviceIndex::build(vec![]), Err(IndexError::EmptyCorpus)));
    }

    #[test]
    fn get_vector_is_stable_across_calls() {
        let idx = AdviceIndex::build(vec![item("a", Bucket::Clear)]).unwrap();
        let v1 = idx.get_vector("a").unwrap();
        let v2 = idx.get_vector("a").unwrap();
        assert_eq!(v1, v2);
        assert!(idx.get_vector("missing").is_err());
    }

    #[test]
    fn search_returns_only_positive_scoring_hits_with_matched_terms() {
        let mut a = item("a", Bucket::Clear);
        a.advice = "listen with empathy".to_string();
        let mut b = item("b", Bucket::Clear);
        b.advice = "set a boundary".to_string();
        let idx = AdviceIndex::build(vec![a, b]).unwrap();

        let hits = idx.search("empathy", false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].score > 0.0);
        assert!(hits[0].matched_terms.contains(&"empathy".to_string()));
    }

    #[test]
    fn candidates_filter_by_tone() {
        let idx = AdviceIndex::build(vec![item("a", Bucket::Clear), item("b", Bucket::Alert)]).unwrap();
        let out = idx.get_advice_candidates("breath", Bucket::Clear, "general", "secure", 0.0, false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item.id, "a");
    }
}
