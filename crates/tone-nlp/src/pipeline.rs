//! `LocalNlp` — C3+C4 combined entry point: runs the local heuristic
//! pipeline (spec §4.3/§4.4) and produces a `CompactDoc`, memoizing by an
//! LRU keyed on the input text so repeated scoring passes over the same
//! message (e.g. tone scoring then advice ranking) don't re-tokenize.

use crate::{context, entities, negation, phrase_edges, sarcasm};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use tone_config::ConfigProvider;
use tone_core::{CompactDoc, Span, COMPACT_DOC_VERSION};

const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Messages longer than this are still analyzed, just not cached (spec
/// §5: "bounded memory, not bounded correctness").
const MAX_CACHEABLE_CHARS: usize = 4_000;

pub struct LocalNlp {
    cache: Mutex<LruCache<u64, CompactDoc>>,
}

impl Default for LocalNlp {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl LocalNlp {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn cache_key(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }

    /// Run the full local pipeline over `text`, producing a `CompactDoc`.
    /// Never fails: every stage degrades to an empty/neutral result rather
    /// than erroring (spec §7: local analysis has no externally-visible
    /// failure mode).
    pub fn analyze(&self, text: &str, config: &ConfigProvider) -> CompactDoc {
        if text.chars().count() <= MAX_CACHEABLE_CHARS {
            let key = Self::cache_key(text);
            if let Some(hit) = self.cache.lock().get(&key) {
                return hit.clone();
            }
            let doc = self.analyze_uncached(text, config);
            self.cache.lock().put(key, doc.clone());
            doc
        } else {
            self.analyze_uncached(text, config)
        }
    }

    fn analyze_uncached(&self, text: &str, config: &ConfigProvider) -> CompactDoc {
        let tokens = crate::tokenize::tokenize(text);
        let sents = crate::tokenize::split_sentences(text);
        let sents = if sents.is_empty() {
            vec![Span {
                start: 0,
                end: text.chars().count(),
            }]
        } else {
            sents
        };

        let markers = negation::find_markers(&tokens, config.negation_indicators());
        let (neg_scopes, deps) = negation::infer_scopes(&tokens, &markers);

        let mut subtree_span = std::collections::HashMap::new();
        for tok in &tokens {
            subtree_span.insert(
                tok.i,
                Span {
                    start: tok.start,
                    end: tok.end,
                },
            );
        }
        for dep in &deps {
            let dep_span = Span {
                start: dep.char_start,
                end: dep.char_end,
            };
            subtree_span
                .entry(dep.head)
                .and_modify(|s| *s = s.merge(&dep_span))
                .or_insert(dep_span);
        }

        let entities = entities::tag_second_person(&tokens);

        let text_lower = text.to_lowercase();
        let context = context::classify(&text_lower, config.context_classifier());

        let sarcasm_patterns = sarcasm::compile(config.sarcasm_indicators());
        let sarcasm = sarcasm::detect(text, &sarcasm_patterns);

        let phrase_edge_patterns = phrase_edges::compile(config.phrase_edges());
        let edges = phrase_edges::detect(text, &phrase_edge_patterns);

        CompactDoc {
            version: COMPACT_DOC_VERSION.to_string(),
            tokens,
            sents,
            deps,
            subtree_span,
            sarcasm,
            context,
            phrase_edges: edges,
            neg_scopes,
            entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn empty_config() -> ConfigProvider {
        let mut raw: HashMap<String, serde_json::Value> = HashMap::new();
        raw.insert("therapyAdvice".into(), serde_json::json!([]));
        raw.insert("toneTriggerWords".into(), serde_json::json!({}));
        raw.insert("toneBucketMapping".into(), serde_json::json!({}));
        raw.insert("contextClassifier".into(), serde_json::json!({}));
        ConfigProvider::from_blobs(raw).unwrap()
    }

    #[test]
    fn analyze_produces_nonempty_doc() {
        let nlp = LocalNlp::default();
        let cfg = empty_config();
        let doc = nlp.analyze("you never listen to me!", &cfg);
        assert!(!doc.tokens.is_empty());
        assert!(!doc.sents.is_empty());
        assert_eq!(doc.second_person_count(), 1);
    }

    #[test]
    fn cache_returns_identical_doc_on_repeat() {
        let nlp = LocalNlp::default();
        let cfg = empty_config();
        let a = nlp.analyze("hello there", &cfg);
        let b = nlp.analyze("hello there", &cfg);
        assert_eq!(a.tokens.len(), b.tokens.len());
    }
}
