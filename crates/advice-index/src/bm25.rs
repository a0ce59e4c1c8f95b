//! Hand-rolled BM25 over the therapy-advice corpus (spec §4.10:
//! `k1 = 1.2`, `b = 0.75`, `idf = ln(1 + (N - df + 0.5) / (df + 0.5))`).
//!
//! No inverted-index engine here: the corpus is small enough (a few
//! thousand items at most) that a flat per-document term-frequency table
//! scored on every query is both simpler and fast enough.

use std::collections::HashMap;
use tone_core::AdviceItem;

const K1: f64 = 1.2;
const B: f64 = 0.75;

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn doc_text(item: &AdviceItem) -> String {
    let mut parts = vec![item.advice.clone()];
    parts.extend(item.keywords.iter().cloned());
    parts.extend(item.tags.iter().cloned());
    parts.join(" ")
}

pub struct Bm25Index {
    ids: Vec<String>,
    doc_term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    df: HashMap<String, u32>,
    n: usize,
}

impl Bm25Index {
    pub fn build(items: &[AdviceItem]) -> Self {
        let mut ids = Vec::with_capacity(items.len());
        let mut doc_term_freqs = Vec::with_capacity(items.len());
        let mut doc_lens = Vec::with_capacity(items.len());
        let mut df: HashMap<String, u32> = HashMap::new();

        for item in items {
            let terms = tokenize(&doc_text(item));
            doc_lens.push(terms.len());
            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in &terms {
                *tf.entry(term.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            ids.push(item.id.clone());
            doc_term_freqs.push(tf);
        }

        let n = items.len();
        let avg_doc_len = if n == 0 {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / n as f64
        };

        Self {
            ids,
            doc_term_freqs,
            doc_lens,
            avg_doc_len,
            df,
            n,
        }
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.df.get(term).copied().unwrap_or(0) as f64;
        ((self.n as f64 - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Score every document against `query_terms`, returning `(id, score)`
    /// sorted descending by score. Documents scoring exactly `0.0` are
    /// still included (spec §8: "BM25 scoring is deterministic and total
    /// over the corpus, ranking happens downstream").
    pub fn score(&self, query_terms: &[String]) -> Vec<(String, f64)> {
        if self.n == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.n);
        for doc_idx in 0..self.n {
            let tf_map = &self.doc_term_freqs[doc_idx];
            let doc_len = self.doc_lens[doc_idx] as f64;
            let mut score = 0.0;
            for term in query_terms {
                let tf = tf_map.get(term).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    continue;
                }
                let idf = self.idf(term);
                let numerator = tf * (K1 + 1.0);
                let denominator = tf + K1 * (1.0 - B + B * (doc_len / self.avg_doc_len.max(1.0)));
                score += idf * (numerator / denominator);
            }
            out.push((self.ids[doc_idx].clone(), score));
        }
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// All distinct terms in the corpus, used by query expansion for
    /// prefix/fuzzy candidate lookup.
    pub fn vocabulary(&self) -> impl Iterator<Item = &String> {
        self.df.keys()
    }
}
