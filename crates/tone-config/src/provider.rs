//! `ConfigProvider` — a read-only typed accessor over the ~20 named JSON
//! config blobs the engine is bootstrapped from (spec §3, §4.1, §7).
//!
//! Construction takes pre-parsed `serde_json::Value` blobs (the owning
//! application decides how config is fetched/cached); `from_dir` is a thin
//! non-validating convenience on top of that for local development and
//! tests, reading `<name>.json` files out of a directory.

use crate::blobs::*;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

/// Blobs the engine cannot run without (spec §4.1: "critical config
/// missing at boot is a hard failure").
pub const CRITICAL_BLOBS: &[&str] = &[
    "therapyAdvice",
    "toneTriggerWords",
    "toneBucketMapping",
    "contextClassifier",
];

/// All named blobs this provider knows how to parse (spec §3).
pub const ALL_BLOBS: &[&str] = &[
    "therapyAdvice",
    "contextClassifier",
    "toneTriggerWords",
    "intensityModifiers",
    "sarcasmIndicators",
    "negationIndicators",
    "negationPatterns",
    "phraseEdges",
    "tonePatterns",
    "toneBucketMapping",
    "weightModifiers",
    "guardrailConfig",
    "profanityLexicons",
    "attachmentOverrides",
    "attachmentToneWeights",
    "semanticThesaurus",
    "evaluationTones",
    "learningSignals",
];

fn is_critical(name: &str) -> bool {
    CRITICAL_BLOBS.contains(&name)
}

/// camelCase/snake_case alias resolution for `get(name)` (spec §4.1 notes
/// older callers may still ask for the snake_case form).
fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct ConfigProvider {
    raw: HashMap<String, serde_json::Value>,
    therapy_advice: TherapyAdviceConfig,
    context_classifier: ContextClassifierConfig,
    tone_trigger_words: ToneTriggerWords,
    intensity_modifiers: IntensityModifiersConfig,
    sarcasm_indicators: SarcasmIndicatorsConfig,
    negation_indicators: NegationIndicatorsConfig,
    negation_patterns: NegationPatternsConfig,
    phrase_edges: PhraseEdgesConfig,
    tone_patterns: TonePatternsConfig,
    tone_bucket_mapping: ToneBucketMapping,
    weight_modifiers: WeightModifiers,
    guardrail_config: GuardrailConfig,
    profanity_lexicons: ProfanityLexiconsConfig,
    attachment_overrides: AttachmentOverridesConfig,
    attachment_tone_weights: AttachmentToneWeights,
    semantic_thesaurus: Option<SemanticThesaurusConfig>,
    evaluation_tones: EvaluationTonesConfig,
    learning_signals: LearningSignalsConfig,
}

impl ConfigProvider {
    /// Build a provider from pre-parsed blobs. Missing non-critical blobs
    /// fall back to their documented default shape; a missing or malformed
    /// critical blob is a hard error (spec §4.1, §7: `CriticalConfigMissing`).
    pub fn from_blobs(raw: HashMap<String, serde_json::Value>) -> Result<Self, ConfigError> {
        for name in ALL_BLOBS {
            match raw.get(*name) {
                Some(_) => tracing::debug!(blob = *name, "config.blob.present"),
                None if is_critical(name) => {
                    tracing::error!(blob = *name, "config.blob.missing.critical");
                }
                None => tracing::debug!(blob = *name, "config.blob.missing"),
            }
        }

        let therapy_advice = Self::parse(&raw, "therapyAdvice")?;
        let context_classifier = Self::parse(&raw, "contextClassifier")?;
        let tone_trigger_words = Self::parse(&raw, "toneTriggerWords")?;
        let intensity_modifiers = Self::parse(&raw, "intensityModifiers")?;
        let sarcasm_indicators = Self::parse(&raw, "sarcasmIndicators")?;
        let negation_indicators = Self::parse(&raw, "negationIndicators")?;
        let negation_patterns = Self::parse(&raw, "negationPatterns")?;
        let phrase_edges = Self::parse(&raw, "phraseEdges")?;
        let tone_patterns = Self::parse(&raw, "tonePatterns")?;
        let tone_bucket_mapping = Self::parse(&raw, "toneBucketMapping")?;
        let weight_modifiers = Self::parse(&raw, "weightModifiers")?;
        let guardrail_config = Self::parse(&raw, "guardrailConfig")?;
        let profanity_lexicons = Self::parse(&raw, "profanityLexicons")?;
        let attachment_overrides = Self::parse(&raw, "attachmentOverrides")?;
        let attachment_tone_weights = Self::parse(&raw, "attachmentToneWeights")?;
        let semantic_thesaurus = raw.get("semanticThesaurus").map(|_| Self::parse(&raw, "semanticThesaurus")).transpose()?;
        let evaluation_tones = Self::parse(&raw, "evaluationTones")?;
        let learning_signals = Self::parse(&raw, "learningSignals")?;

        tracing::info!(
            blobs_present = raw.len(),
            blobs_known = ALL_BLOBS.len(),
            "config.provider.ready"
        );

        Ok(Self {
            raw,
            therapy_advice,
            context_classifier,
            tone_trigger_words,
            intensity_modifiers,
            sarcasm_indicators,
            negation_indicators,
            negation_patterns,
            phrase_edges,
            tone_patterns,
            tone_bucket_mapping,
            weight_modifiers,
            guardrail_config,
            profanity_lexicons,
            attachment_overrides,
            attachment_tone_weights,
            semantic_thesaurus,
            evaluation_tones,
            learning_signals,
        })
    }

    /// Non-validating convenience: read `<name>.json` for every known blob
    /// name out of `dir` (missing files are simply absent from the map) and
    /// delegate to [`Self::from_blobs`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut raw = HashMap::new();
        for name in ALL_BLOBS {
            let path = dir.join(format!("{name}.json"));
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::DirUnreadable(path.display().to_string(), e))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| ConfigError::Malformed((*name).to_string(), e))?;
            raw.insert((*name).to_string(), value);
        }
        Self::from_blobs(raw)
    }

    fn parse<T: Default + DeserializeOwned>(
        raw: &HashMap<String, serde_json::Value>,
        name: &str,
    ) -> Result<T, ConfigError> {
        match raw.get(name) {
            None if is_critical(name) => Err(ConfigError::CriticalMissing(name.to_string())),
            None => Ok(T::default()),
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(parsed) => Ok(parsed),
                Err(e) if is_critical(name) => Err(ConfigError::Malformed(name.to_string(), e)),
                Err(e) => {
                    tracing::warn!(blob = name, error = %e, "config.blob.malformed.fallback");
                    Ok(T::default())
                }
            },
        }
    }

    /// Raw accessor with camelCase/snake_case alias fallthrough (spec §4.1).
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw
            .get(name)
            .or_else(|| self.raw.get(&camel_to_snake(name)))
    }

    pub fn therapy_advice(&self) -> &TherapyAdviceConfig {
        &self.therapy_advice
    }

    pub fn context_classifier(&self) -> &ContextClassifierConfig {
        &self.context_classifier
    }

    pub fn tone_trigger_words(&self) -> &ToneTriggerWords {
        &self.tone_trigger_words
    }

    pub fn intensity_modifiers(&self) -> &IntensityModifiersConfig {
        &self.intensity_modifiers
    }

    pub fn sarcasm_indicators(&self) -> &SarcasmIndicatorsConfig {
        &self.sarcasm_indicators
    }

    pub fn negation_indicators(&self) -> &NegationIndicatorsConfig {
        &self.negation_indicators
    }

    pub fn negation_patterns(&self) -> &NegationPatternsConfig {
        &self.negation_patterns
    }

    pub fn phrase_edges(&self) -> &PhraseEdgesConfig {
        &self.phrase_edges
    }

    pub fn tone_patterns(&self) -> &TonePatternsConfig {
        &self.tone_patterns
    }

    pub fn tone_bucket_mapping(&self) -> &ToneBucketMapping {
        &self.tone_bucket_mapping
    }

    pub fn weight_modifiers(&self) -> &WeightModifiers {
        &self.weight_modifiers
    }

    pub fn guardrail_config(&self) -> &GuardrailConfig {
        &self.guardrail_config
    }

    pub fn profanity_lexicons(&self) -> &ProfanityLexiconsConfig {
        &self.profanity_lexicons
    }

    pub fn attachment_overrides(&self) -> &AttachmentOverridesConfig {
        &self.attachment_overrides
    }

    pub fn attachment_tone_weights(&self) -> &AttachmentToneWeights {
        &self.attachment_tone_weights
    }

    pub fn semantic_thesaurus(&self) -> Option<&SemanticThesaurusConfig> {
        self.semantic_thesaurus.as_ref()
    }

    pub fn evaluation_tones(&self) -> &EvaluationTonesConfig {
        &self.evaluation_tones
    }

    pub fn learning_signals(&self) -> &LearningSignalsConfig {
        &self.learning_signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_critical_blob_is_hard_error() {
        let raw = HashMap::new();
        let err = ConfigProvider::from_blobs(raw).unwrap_err();
        assert!(matches!(err, ConfigError::CriticalMissing(name) if name == "therapyAdvice"));
    }

    #[test]
    fn missing_non_critical_blob_falls_back_to_default() {
        let mut raw = HashMap::new();
        raw.insert("therapyAdvice".to_string(), serde_json::json!([]));
        raw.insert("toneTriggerWords".to_string(), serde_json::json!({}));
        raw.insert("toneBucketMapping".to_string(), serde_json::json!({}));
        raw.insert("contextClassifier".to_string(), serde_json::json!({}));
        let provider = ConfigProvider::from_blobs(raw).unwrap();
        assert!(provider.guardrail_config().block.is_empty());
        assert!(provider.semantic_thesaurus().is_none());
    }

    #[test]
    fn from_dir_reads_present_files_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("therapyAdvice", "[]"),
            ("toneTriggerWords", "{}"),
            ("toneBucketMapping", "{}"),
            ("contextClassifier", "{}"),
        ] {
            let mut f = std::fs::File::create(dir.path().join(format!("{name}.json"))).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        }
        let provider = ConfigProvider::from_dir(dir.path()).unwrap();
        assert!(provider.therapy_advice().is_empty());
    }

    #[test]
    fn get_resolves_snake_case_alias() {
        let mut raw = HashMap::new();
        raw.insert("therapyAdvice".to_string(), serde_json::json!([]));
        raw.insert("toneTriggerWords".to_string(), serde_json::json!({}));
        raw.insert("toneBucketMapping".to_string(), serde_json::json!({}));
        raw.insert("contextClassifier".to_string(), serde_json::json!({}));
        raw.insert("guardrail_config".to_string(), serde_json::json!({"block": ["x"]}));
        let provider = ConfigProvider::from_blobs(raw).unwrap();
        assert!(provider.get("guardrailConfig").is_some());
    }
}
