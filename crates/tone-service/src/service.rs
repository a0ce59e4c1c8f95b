//! C13 SuggestionsService (spec §4.13): the orchestrator wiring C1-C12
//! together behind `analyzeTone`, `generateAdvancedSuggestions`, and
//! `toneLive`.
//!
//! Construction validates the critical config blobs (via
//! `ConfigProvider::from_blobs`, already called by the time a
//! `ConfigProvider` reaches here) and the advice corpus, so a service that
//! exists at all is one a request can always be run against.

use crate::analysis;
use crate::cache::{analysis_key, RequestCache};
use crate::error::ServiceError;
use crate::response::{self, ToneResponse};
use crate::stream_engine::StreamEngine;
use crate::suggestions;
use advice_index::AdviceIndex;
use advice_nli::{NliConfig, NliGate};
use advice_rank::{RankConfig, RankRequest};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tone_config::{ConfigProvider, RuntimeFlags};
use tone_core::{Bucket, BucketDist, Suggestion};
use tone_match::TokenScanner;
use tone_nlp::LocalNlp;
use tone_score::AttachmentToneMap;

const DEFAULT_MAX_SUGGESTIONS: usize = 5;
const HARD_MAX_SUGGESTIONS: usize = 10;
const DEFAULT_CACHE_CAPACITY: usize = 512;
const DEFAULT_ADVICE_WARM_MAX: usize = 200;
const DEFAULT_ADVICE_WARM_CONCURRENCY: usize = 4;

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(default)
}

/// Options for `analyzeTone` (spec §6).
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub context: String,
    pub attachment_style: String,
    pub include_attachment_insights: bool,
    pub is_new_user: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            context: "general".to_string(),
            attachment_style: "secure".to_string(),
            include_attachment_insights: false,
            is_new_user: false,
        }
    }
}

/// Caller-supplied profile inputs the ranker's additive score reads (spec
/// §4.12 step 4: premium boost, preferred-category boost, coordinator
/// intent-overlap bonus).
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub is_premium: bool,
    pub preferred_categories: HashMap<String, f64>,
    pub coordinator_intents: Vec<String>,
}

/// Options for `generateAdvancedSuggestions` (spec §4.13, §6).
/// `full_tone_analysis` is required — this orchestrator accepts a prior
/// `analyzeTone` result rather than recomputing it (spec §4.13).
#[derive(Debug, Clone)]
pub struct SuggestionOptions {
    pub max_suggestions: usize,
    pub attachment_style: String,
    pub user_id: Option<String>,
    pub full_tone_analysis: Option<ToneResponse>,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            attachment_style: "secure".to_string(),
            user_id: None,
            full_tone_analysis: None,
        }
    }
}

/// `SuggestionAnalysis` (spec §6): the ranked list plus the tone
/// distribution it was computed against, so a caller can render both
/// without a second round trip.
#[derive(Debug, Clone)]
pub struct SuggestionAnalysis {
    pub suggestions: Vec<Suggestion>,
    pub ui_tone: Bucket,
    pub ui_distribution: BucketDist,
}

pub struct SuggestionsService {
    config: ConfigProvider,
    nlp: LocalNlp,
    scanner: TokenScanner,
    index: AdviceIndex,
    nli: NliGate,
    attachment_map: AttachmentToneMap,
    stream: StreamEngine,
    analysis_cache: RequestCache<ToneResponse>,
    suggestions_cache: RequestCache<Vec<Suggestion>>,
    max_suggestions_cap: usize,
    default_max_suggestions: usize,
    default_mmr_lambda: f64,
}

impl SuggestionsService {
    /// Build the service from an already-bootstrapped `ConfigProvider`
    /// (spec §4.13: "must validate a declared list of critical config
    /// blobs at startup"; `ConfigProvider::from_blobs` is where that
    /// validation actually happens, so a caller holding one already
    /// cleared it). Fails only if the therapy-advice corpus is empty.
    pub fn new(config: ConfigProvider, nli_model_paths: Option<(PathBuf, PathBuf)>) -> Result<Self, ServiceError> {
        let flags = RuntimeFlags::from_env();

        let scan_mode = match std::env::var("AHO_MODE").as_deref() {
            Ok("aho") => tone_match::ScanMode::Aho,
            Ok("fallback") => tone_match::ScanMode::Fallback,
            Ok("hybrid") => tone_match::ScanMode::Hybrid,
            _ => flags.scan_mode.into(),
        };
        let scanner = TokenScanner::new(config.tone_trigger_words(), scan_mode).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "tone_service.scanner.compile_failed_falling_back");
            TokenScanner::new(config.tone_trigger_words(), tone_match::ScanMode::Fallback)
                .expect("fallback scan mode always compiles")
        });

        let nlp = LocalNlp::default();
        let attachment_map = AttachmentToneMap::build(config.tone_bucket_mapping());

        let index = AdviceIndex::build(config.therapy_advice().clone()).map_err(|_| ServiceError::EmptyAdviceCorpus)?;

        let nli_disabled = env_bool("DISABLE_NLI", !flags.nli_enabled);
        let nli_config = NliConfig {
            disabled: nli_disabled,
            timeout_ms: env_usize("NLI_TIMEOUT_MS", flags.nli_timeout.as_millis() as usize) as u64,
            ..NliConfig::from_env()
        };
        let nli = NliGate::new(nli_model_paths, nli_config);

        let cache_capacity = env_usize("PERFORMANCE_CACHE_MAX", DEFAULT_CACHE_CAPACITY);
        let cache_ttl = Duration::from_millis(env_usize("CACHE_EXPIRY_MS", flags.request_cache_ttl.as_millis() as usize) as u64);
        let eviction_fraction = env_f64("CACHE_CLEANUP_PERCENTAGE", flags.request_cache_eviction_fraction);

        Ok(Self {
            config,
            nlp,
            scanner,
            index,
            nli,
            attachment_map,
            stream: StreamEngine::default(),
            analysis_cache: RequestCache::new(cache_capacity, cache_ttl, eviction_fraction),
            suggestions_cache: RequestCache::new(cache_capacity, cache_ttl, eviction_fraction),
            max_suggestions_cap: HARD_MAX_SUGGESTIONS,
            default_max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            default_mmr_lambda: flags.mmr_lambda,
        })
    }

    /// Ensure the NLI backing model is loaded and the advice vector cache
    /// is warm; memoized/idempotent, safe to call from a background task
    /// at boot (spec §4.13: "ensures the NLI model is initialized once …
    /// never blocks request if already ready").
    pub async fn warm_up(&self) {
        self.nli.init().await;
        if env_bool("ADVICE_WARM_DISABLE", false) {
            return;
        }
        let max = env_usize("ADVICE_WARM_MAX", DEFAULT_ADVICE_WARM_MAX);
        let concurrency = env_usize("ADVICE_WARM_CONCURRENCY", DEFAULT_ADVICE_WARM_CONCURRENCY);
        self.index.warm_vectors(max, concurrency).await;
    }

    /// `analyzeTone(text, options)` (spec §6): run C3-C8, translate into
    /// the public `ToneResponse` shape, cached per `(text, context,
    /// attachment)` (spec §4.13, §3 Lifecycles).
    pub fn analyze_tone(&self, text: &str, options: &AnalyzeOptions) -> ToneResponse {
        let now = Instant::now();
        let key = analysis_key(text, &options.context, &options.attachment_style);
        if let Some(cached) = self.analysis_cache.get(&key, now) {
            return cached;
        }

        let outcome = analysis::run(
            text,
            &options.context,
            &options.attachment_style,
            options.is_new_user,
            &self.config,
            &self.nlp,
            &self.scanner,
        );

        // No longitudinal attachment estimator is in scope here (spec's
        // component list stops at C13); `includeAttachmentInsights`
        // degrades to `None` until a caller supplies a precomputed
        // estimate through a future extension point.
        let response = response::build(
            &outcome.score.classification,
            &outcome.score,
            outcome.dist,
            outcome.confidence,
            text,
            &outcome.doc,
            outcome.context_confidence,
            None,
            &options.attachment_style,
            outcome.raw_primary_before_attachment,
        );

        self.analysis_cache.put(key, response.clone(), now);
        response
    }

    /// `generateAdvancedSuggestions(text, context, userProfile, options)`
    /// (spec §4.13, §6): pool C10 candidates across attachment-matched
    /// buckets and rank them with C12, against a caller-supplied
    /// `fullToneAnalysis` rather than a freshly recomputed one.
    pub async fn generate_advanced_suggestions(
        &self,
        text: &str,
        context: &str,
        user_profile: &UserProfile,
        options: &SuggestionOptions,
    ) -> Result<SuggestionAnalysis, ServiceError> {
        let Some(tone) = options.full_tone_analysis.as_ref() else {
            return Err(ServiceError::MissingToneAnalysis);
        };

        let now = Instant::now();
        let requested = if options.max_suggestions == 0 {
            self.default_max_suggestions
        } else {
            options.max_suggestions
        };
        let max_suggestions = requested.min(self.max_suggestions_cap).max(1);
        let key = analysis_key(text, context, &options.attachment_style);
        if let Some(cached) = self.suggestions_cache.get(&key, now) {
            return Ok(SuggestionAnalysis {
                suggestions: cached,
                ui_tone: tone.ui_tone,
                ui_distribution: tone.ui_distribution,
            });
        }

        // The ranker's guardrails need a `CompactDoc` (negation, sarcasm,
        // second-person entities) that the public `ToneResponse` doesn't
        // carry; recomputing it here is substrate for ranking, not a
        // recomputation of the tone analysis itself.
        let doc = self.nlp.analyze(text, &self.config);

        let severity_baseline = tone.intensity;
        let candidates = suggestions::candidate_pool(
            &self.index,
            &self.attachment_map,
            text,
            tone.ui_tone,
            context,
            &options.attachment_style,
            severity_baseline,
            true,
        );

        let rank_request = RankRequest {
            text,
            doc: &doc,
            classification: &tone.tone.classification,
            context,
            dist: &tone.ui_distribution,
            intensity: tone.intensity,
            attachment_style: &options.attachment_style,
            severity_baseline,
            coordinator_confidence: tone.tone.confidence,
            is_premium: user_profile.is_premium,
            user_pref_categories: &user_profile.preferred_categories,
            coordinator_intents: &user_profile.coordinator_intents,
            max_suggestions,
            mmr_lambda: Some(env_f64("MMR_LAMBDA", self.default_mmr_lambda)),
            disable_weight_fallbacks: env_bool("DISABLE_WEIGHT_FALLBACKS", false),
            vectors: Some(&self.index),
        };
        let rank_config = RankConfig {
            guardrail: self.config.guardrail_config(),
            profanity_lexicon: self.config.profanity_lexicons(),
            weight_modifiers: self.config.weight_modifiers(),
            tone_patterns: self.config.tone_patterns(),
            attachment_tone_weights: self.config.attachment_tone_weights(),
            attachment_overrides: self.config.attachment_overrides(),
            learning_signals: self.config.learning_signals(),
            evaluation_tones: self.config.evaluation_tones(),
            attachment_tone_map: &self.attachment_map,
        };

        let suggestions = advice_rank::rank(candidates, &self.nli, &rank_request, &rank_config).await;

        self.suggestions_cache.put(key, suggestions.clone(), now);

        Ok(SuggestionAnalysis {
            suggestions,
            ui_tone: tone.ui_tone,
            ui_distribution: tone.ui_distribution,
        })
    }

    /// `toneLive.get(fieldId, context, style)` (spec §6): the live,
    /// streamed distribution without feeding new input.
    pub fn tone_live_get(&self, field_id: &str, attachment_style: &str) -> BucketDist {
        self.stream.get(field_id, attachment_style, &self.attachment_map, Instant::now())
    }

    /// `feedChar(fieldId, ch, context)` (spec §4.9): feed one incremental
    /// character for `field_id` and return the updated live distribution.
    pub fn tone_live_feed_char(&self, field_id: &str, ch: char, context: &str) -> BucketDist {
        self.stream.feed_char(field_id, ch, context, &self.config, &self.scanner, Instant::now())
    }

    /// `reset(fieldId)` (spec §4.9): drop all streamed state for a field.
    pub fn tone_live_reset(&self, field_id: &str) {
        self.stream.reset(field_id);
    }

    /// `resetConversationMemory(fieldId?)` (spec §6): a specific
    /// conversation's memory when given, otherwise every conversation's.
    pub fn reset_conversation_memory(&self, field_id: Option<&str>) {
        self.stream.reset_conversation_memory(field_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> ConfigProvider {
        let mut raw = HashMap::new();
        raw.insert(
            "therapyAdvice".to_string(),
            serde_json::json!([{
                "id": "a1",
                "advice": "take a gentle breath and name the feeling before responding",
                "trigger_tone": "alert",
                "contexts": [],
                "attachment_styles": [],
                "severity_threshold": {},
                "categories": ["de-escalation"],
                "intents": [],
                "context_link": [],
                "patterns": [],
                "tags": [],
                "style_tuning": {},
                "boost_sources": [],
                "keywords": [],
                "negation_sensitive": false
            }]),
        );
        raw.insert(
            "toneTriggerWords".to_string(),
            serde_json::json!({
                "alert": [{"text": "shut up", "intensity": 0.9, "type": "phrase"}]
            }),
        );
        raw.insert("toneBucketMapping".to_string(), serde_json::json!({}));
        raw.insert("contextClassifier".to_string(), serde_json::json!({}));
        ConfigProvider::from_blobs(raw).unwrap()
    }

    #[test]
    fn new_fails_on_empty_advice_corpus() {
        let mut raw = HashMap::new();
        raw.insert("therapyAdvice".to_string(), serde_json::json!([]));
        raw.insert("toneTriggerWords".to_string(), serde_json::json!({}));
        raw.insert("toneBucketMapping".to_string(), serde_json::json!({}));
        raw.insert("contextClassifier".to_string(), serde_json::json!({}));
        let config = ConfigProvider::from_blobs(raw).unwrap();
        let err = SuggestionsService::new(config, None).unwrap_err();
        assert!(matches!(err, ServiceError::EmptyAdviceCorpus));
    }

    #[test]
    fn analyze_tone_is_idempotent_across_cache_hit_and_miss() {
        let service = SuggestionsService::new(config(), None).unwrap();
        let options = AnalyzeOptions::default();
        let first = service.analyze_tone("just shut up already", &options);
        let second = service.analyze_tone("just shut up already", &options);
        assert_eq!(first, second);
        assert_eq!(first.ui_tone, Bucket::Alert);
    }

    #[tokio::test]
    async fn generate_advanced_suggestions_requires_full_tone_analysis() {
        let service = SuggestionsService::new(config(), None).unwrap();
        let profile = UserProfile::default();
        let options = SuggestionOptions::default();
        let err = service
            .generate_advanced_suggestions("just shut up already", "general", &profile, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingToneAnalysis));
    }

    #[tokio::test]
    async fn generate_advanced_suggestions_returns_ranked_items_for_alert() {
        let service = SuggestionsService::new(config(), None).unwrap();
        let analyze_options = AnalyzeOptions::default();
        let tone = service.analyze_tone("just shut up already", &analyze_options);
        let profile = UserProfile::default();
        let options = SuggestionOptions {
            full_tone_analysis: Some(tone),
            ..SuggestionOptions::default()
        };
        let out = service
            .generate_advanced_suggestions("just shut up already", "general", &profile, &options)
            .await
            .unwrap();
        assert_eq!(out.ui_tone, Bucket::Alert);
    }

    #[test]
    fn tone_live_feed_char_then_get_reports_same_distribution() {
        let service = SuggestionsService::new(config(), None).unwrap();
        for ch in "shut up ".chars() {
            service.tone_live_feed_char("f1", ch, "general");
        }
        let live = service.tone_live_get("f1", "secure");
        assert_eq!(live.primary, Bucket::Alert);
        service.tone_live_reset("f1");
        assert_eq!(service.tone_live_get("f1", "secure").primary, Bucket::Clear);
    }
}
