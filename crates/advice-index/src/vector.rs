//! "Dense" retrieval vectors (spec GLOSSARY: `embed(text)` is "a fixed
//! 30-dimensional hand-engineered feature vector, *not* a learned
//! embedding"). Grounded on `crates/rag/src/embeddings.rs`'s
//! `SimpleEmbedder` fallback path — this crate generalizes that into the
//! *only* embedder; there is no real embedding model in scope (spec
//! GLOSSARY).

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tone_core::AdviceItem;

pub const VECTOR_DIM: usize = 30;
pub const DEFAULT_VECTOR_CACHE_CAPACITY: usize = 2_000;
pub const DEFAULT_WARM_MAX: usize = 200;
pub const DEFAULT_WARM_CONCURRENCY: usize = 10;

/// Hash-bucketed bag-of-words histogram (dims 0..24) plus a handful of
/// interpretable structural features (dims 24..30), L2-normalized.
pub fn embed(text: &str) -> [f32; VECTOR_DIM] {
    const HIST_DIMS: usize = 24;
    let mut v = [0.0f32; VECTOR_DIM];

    let words: Vec<&str> = text.split_whitespace().collect();
    for word in &words {
        let mut hash: u32 = 2166136261;
        for b in word.bytes() {
            hash ^= b as u32;
            hash = hash.wrapping_mul(16777619);
        }
        v[(hash as usize) % HIST_DIMS] += 1.0;
    }

    let word_count = words.len().max(1) as f32;
    let char_count = text.chars().count().max(1) as f32;
    let avg_word_len = words.iter().map(|w| w.chars().count()).sum::<usize>() as f32 / word_count;
    let punct_count = text.chars().filter(|c| matches!(c, '!' | '?' | '.')).count() as f32;
    let upper_count = text.chars().filter(|c| c.is_uppercase()).count() as f32;
    let modal_count = words
        .iter()
        .filter(|w| {
            matches!(
                w.to_lowercase().as_str(),
                "could" | "should" | "would" | "maybe" | "might" | "perhaps"
            )
        })
        .count() as f32;

    v[24] = (char_count / 280.0).min(1.0);
    v[25] = (word_count / 60.0).min(1.0);
    v[26] = (avg_word_len / 10.0).min(1.0);
    v[27] = (punct_count / word_count).min(1.0);
    v[28] = (upper_count / char_count).min(1.0);
    v[29] = (modal_count / word_count).min(1.0);

    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= 0.0 || norm_b <= 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// LRU cache of `id -> vector`, computed lazily on first request
/// (spec §4.10: "getVector(id) computes and caches on demand").
pub struct VectorCache {
    cache: Mutex<LruCache<String, Arc<[f32; VECTOR_DIM]>>>,
}

impl VectorCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_or_compute(&self, id: &str, text: &str) -> Arc<[f32; VECTOR_DIM]> {
        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(id) {
            return hit.clone();
        }
        let vector = Arc::new(embed(text));
        cache.put(id.to_string(), vector.clone());
        vector
    }

    pub fn get(&self, id: &str) -> Option<Arc<[f32; VECTOR_DIM]>> {
        self.cache.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VectorCache {
    fn default() -> Self {
        Self::new(DEFAULT_VECTOR_CACHE_CAPACITY)
    }
}

/// Pre-populate the vector cache for up to `max` corpus items, at most
/// `concurrency` in flight at once (spec §4.10: "warm-up loads up to
/// WARM_MAX... with bounded concurrency ≤10"). The computation itself is
/// synchronous; the `async`/`Semaphore` shape exists to preserve I/O
/// parity with a real embedding-model warm-up (spec §5: "`spacyClient.embed`
/// during retrieval... exists to preserve I/O parity").
pub async fn warm_up(cache: &VectorCache, items: &[AdviceItem], max: usize, concurrency: usize) {
    use tokio::sync::Semaphore;

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::new();
    for item in items.iter().take(max) {
        let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
        let id = item.id.clone();
        let text = item.advice.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            (id, embed(&text))
        }));
    }

    for handle in handles {
        if let Ok((id, vector)) = handle.await {
            let mut guard = cache.cache.lock();
            guard.put(id, Arc::new(vector));
        }
    }

    tracing::info!(
        warmed = cache.len(),
        requested = items.len().min(max),
        "advice_index.vector_cache.warmed"
    );
}
