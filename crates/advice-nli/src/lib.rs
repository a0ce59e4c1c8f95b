//! C11 NLI Fit Gate: wraps a local zero-shot/MNLI model behind one
//! interface — hypothesis generation, single/batched scoring with a
//! timeout + single retry, a per-context entail/contra threshold decision,
//! and a rules-only backstop for when the model is disabled or
//! unavailable (spec §4.11).

pub mod engine;
pub mod error;
pub mod hypothesis;
pub mod rules_backstop;

pub use engine::{NliEngine, NliOutcome};
pub use error::NliError;
pub use hypothesis::{hypothesis_for_advice, HypothesisCache, HYPOTHESIS_CACHE_CAPACITY};
pub use rules_backstop::{BackstopReason, BackstopVerdict};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tone_config::NliThresholds;
use tone_core::{AdviceItem, CompactDoc};
use tokio::sync::OnceCell;

/// Runtime-tunable knobs, all overridable by environment variable (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct NliConfig {
    pub disabled: bool,
    pub timeout_ms: u64,
    pub max_items: usize,
    pub batch_size: usize,
    pub entail_min_default: f64,
    pub contra_max_default: f64,
    pub temperature: f64,
}

impl Default for NliConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            timeout_ms: 400,
            max_items: 60,
            batch_size: 8,
            entail_min_default: 0.55,
            contra_max_default: 0.20,
            temperature: 1.0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl NliConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            disabled: std::env::var("DISABLE_NLI").map(|v| v == "1").unwrap_or(false),
            timeout_ms: env_parse("NLI_TIMEOUT_MS", defaults.timeout_ms),
            max_items: env_parse("NLI_MAX_ITEMS", defaults.max_items),
            batch_size: env_parse("NLI_BATCH_SIZE", defaults.batch_size),
            entail_min_default: env_parse("NLI_ENTAIL_MIN_DEFAULT", defaults.entail_min_default),
            contra_max_default: env_parse("NLI_CONTRA_MAX_DEFAULT", defaults.contra_max_default),
            temperature: env_parse("NLI_TEMP", defaults.temperature),
        }
    }

    fn thresholds_or_default(&self, thresholds: Option<NliThresholds>) -> NliThresholds {
        thresholds.unwrap_or(NliThresholds {
            entail_min: self.entail_min_default,
            contra_max: self.contra_max_default,
        })
    }
}

/// The per-item outcome the ranker consumes (spec §4.11: `__nli = {ok,
/// reason}`, plus the raw scores used by §4.12 step 8's signal shaping).
#[derive(Debug, Clone, PartialEq)]
pub struct NliVerdict {
    pub ok: bool,
    pub reason: String,
    pub entail: Option<f64>,
    pub contra: Option<f64>,
    pub backstop: Option<BackstopVerdict>,
}

impl NliVerdict {
    fn fail_open(reason: &str, backstop: BackstopVerdict) -> Self {
        Self {
            ok: true,
            reason: reason.to_string(),
            entail: None,
            contra: None,
            backstop: Some(backstop),
        }
    }

    fn pass_through() -> Self {
        Self {
            ok: true,
            reason: "nli_pass_through".to_string(),
            entail: None,
            contra: None,
            backstop: None,
        }
    }
}

pub struct NliGate {
    config: NliConfig,
    hypotheses: HypothesisCache,
    model_paths: Option<(PathBuf, PathBuf)>,
    engine: OnceCell<Option<Arc<NliEngine>>>,
}

impl NliGate {
    pub fn new(model_paths: Option<(PathBuf, PathBuf)>, config: NliConfig) -> Self {
        Self {
            config,
            hypotheses: HypothesisCache::default(),
            model_paths,
            engine: OnceCell::new(),
        }
    }

    /// Ensure the backing model is loaded, memoized across calls/callers
    /// (spec §5: "`NLI.init()` memoized; only first call across the
    /// process"). Returns whether a usable model ended up loaded.
    pub async fn init(&self) -> bool {
        if self.config.disabled {
            return false;
        }
        let loaded = self
            .engine
            .get_or_init(|| async {
                match &self.model_paths {
                    None => None,
                    Some((model_path, tokenizer_path)) => {
                        let model_path = model_path.clone();
                        let tokenizer_path = tokenizer_path.clone();
                        let temperature = self.config.temperature;
                        let result = tokio::task::spawn_blocking(move || NliEngine::load(model_path, tokenizer_path, temperature)).await;
                        match result {
                            Ok(Ok(engine)) => Some(Arc::new(engine)),
                            Ok(Err(e)) => {
                                tracing::warn!(error = %e, "advice_nli.engine.load_failed");
                                None
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "advice_nli.engine.load_panicked");
                                None
                            }
                        }
                    }
                }
            })
            .await;
        loaded.is_some()
    }

    /// Score one `(text, item)` pair with a timeout + single retry, falling
    /// open (with a rules-backstop-derived reason) on disable/
    /// unavailability/timeout/error (spec §4.11, §5).
    pub async fn check(
        &self,
        text: &str,
        doc: &CompactDoc,
        classification: &str,
        item: &AdviceItem,
        user_intents: &[String],
        thresholds: Option<NliThresholds>,
    ) -> NliVerdict {
        let thresholds = self.config.thresholds_or_default(thresholds);
        let backstop = rules_backstop::evaluate(text, doc, classification, item, user_intents);

        if self.config.disabled {
            return NliVerdict::fail_open("nli_disabled", backstop);
        }

        let Some(engine) = self.engine.get().cloned().flatten() else {
            return NliVerdict::fail_open("nli_unavailable", backstop);
        };

        let hypothesis = self.hypotheses.get_or_compute(item);
        let timeout = Duration::from_millis(self.config.timeout_ms);

        for attempt in 0..2 {
            let engine = engine.clone();
            let premise = text.to_string();
            let hypothesis = hypothesis.clone();
            let task = tokio::task::spawn_blocking(move || engine.score(&premise, &hypothesis));

            match tokio::time::timeout(timeout, task).await {
                Ok(Ok(Ok(outcome))) => {
                    let ok = outcome.entail >= thresholds.entail_min && outcome.contra <= thresholds.contra_max;
                    return NliVerdict {
                        ok,
                        reason: if ok { "nli_ok".to_string() } else { "nli_batch".to_string() },
                        entail: Some(outcome.entail),
                        contra: Some(outcome.contra),
                        backstop: Some(backstop),
                    };
                }
                Ok(Ok(Err(e))) => {
                    tracing::debug!(error = %e, attempt, "advice_nli.score.failed");
                }
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, attempt, "advice_nli.score.panicked");
                }
                Err(_) => {
                    tracing::debug!(timeout_ms = self.config.timeout_ms, attempt, "advice_nli.score.timeout");
                }
            }
        }

        NliVerdict::fail_open("nli_error", backstop)
    }

    /// Score `items` against a shared premise in configured batch sizes;
    /// everything past `NLI_MAX_ITEMS` is passed through unchecked (spec
    /// §4.11: "items beyond NLI_MAX_ITEMS are passed through without
    /// checking").
    pub async fn check_batch(
        &self,
        text: &str,
        doc: &CompactDoc,
        classification: &str,
        items: &[&AdviceItem],
        user_intents: &[String],
        thresholds: Option<NliThresholds>,
    ) -> Vec<NliVerdict> {
        let mut out = Vec::with_capacity(items.len());
        for chunk in items.iter().take(self.config.max_items).collect::<Vec<_>>().chunks(self.config.batch_size) {
            for item in chunk {
                out.push(self.check(text, doc, classification, item, user_intents, thresholds).await);
            }
        }
        out.extend(std::iter::repeat_with(NliVerdict::pass_through).take(items.len().saturating_sub(self.config.max_items)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn item(id: &str) -> AdviceItem {
        AdviceItem {
            id: id.to_string(),
            advice: "take a breath before responding".to_string(),
            trigger_tone: tone_core::Bucket::Caution,
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: HashMap::new(),
            categories: vec![],
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

    #[tokio::test]
    async fn disabled_gate_fails_open_with_backstop() {
        let gate = NliGate::new(None, NliConfig { disabled: true, ..Default::default() });
        let doc = CompactDoc::fallback("take a breath");
        let verdict = gate.check("take a breath", &doc, "neutral", &item("a"), &[], None).await;
        assert!(verdict.ok);
        assert_eq!(verdict.reason, "nli_disabled");
        assert!(verdict.backstop.is_some());
    }

    #[tokio::test]
    async fn missing_model_fails_open_as_unavailable() {
        let gate = NliGate::new(None, NliConfig::default());
        gate.init().await;
        let doc = CompactDoc::fallback("hello");
        let verdict = gate.check("hello", &doc, "neutral", &item("a"), &[], None).await;
        assert!(verdict.ok);
        assert_eq!(verdict.reason, "nli_unavailable");
    }

    #[tokio::test]
    async fn max_items_overflow_passes_through() {
        let gate = NliGate::new(None, NliConfig { disabled: true, max_items: 1, ..Default::default() });
        let items = vec![item("a"), item("b"), item("c")];
        let refs: Vec<&AdviceItem> = items.iter().collect();
        let doc = CompactDoc::fallback("hello");
        let verdicts = gate.check_batch("hello", &doc, "neutral", &refs, &[], None).await;
        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[2].reason, "nli_pass_through");
    }
}
