//! Typed shapes for the ~20 named JSON config blobs (spec §3).
//!
//! Every type here has a `Default` impl that is the blob's documented
//! "minimal fallback shape" (spec §4.1: "missing files degrade rather than
//! crash"). Two plausible shapes exist for the same file (`toneTriggerWords`,
//! `profanityLexicons`); only the richer canonical shape is deserialized —
//! see DESIGN.md Open Question decision #3.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tone_core::AdviceItem;

/// `{clear, caution, alert}` delta/base triple used throughout bucket
/// mapping (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BucketTriple {
    #[serde(default)]
    pub clear: f64,
    #[serde(default)]
    pub caution: f64,
    #[serde(default)]
    pub alert: f64,
}

// ---------------------------------------------------------------------
// therapyAdvice
// ---------------------------------------------------------------------

pub type TherapyAdviceConfig = Vec<AdviceItem>;

// ---------------------------------------------------------------------
// contextClassifier
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContextPhrase {
    pub text: String,
    #[serde(default = "default_one")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContextDef {
    pub name: String,
    #[serde(default)]
    pub phrases: Vec<ContextPhrase>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub confidence_boosts: HashMap<String, f64>,
    #[serde(default)]
    pub severity: HashMap<String, f64>,
    #[serde(default)]
    pub deescalators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineSection {
    #[serde(default)]
    pub generic_stop_tokens: Vec<String>,
    #[serde(default)]
    pub guard_thresholds: HashMap<String, f64>,
    #[serde(default)]
    pub context_scopes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContextClassifierConfig {
    #[serde(default)]
    pub contexts: Vec<ContextDef>,
    #[serde(default)]
    pub engine: EngineSection,
}

// ---------------------------------------------------------------------
// toneTriggerWords
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TriggerRecord {
    pub text: String,
    #[serde(default)]
    pub intensity: f64,
    #[serde(default = "default_trigger_type", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub aho: Vec<String>,
    #[serde(default)]
    pub context_tags: Vec<String>,
}

fn default_trigger_type() -> String {
    "phrase".to_string()
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToneTriggerWords {
    #[serde(default)]
    pub clear: Vec<TriggerRecord>,
    #[serde(default)]
    pub caution: Vec<TriggerRecord>,
    #[serde(default)]
    pub alert: Vec<TriggerRecord>,
    /// `contextMultipliers[ctx][type] -> multiplier`.
    #[serde(default)]
    pub context_multipliers: HashMap<String, HashMap<String, f64>>,
    /// `attachmentBias[style][dim] -> bias`.
    #[serde(default)]
    pub attachment_bias: HashMap<String, HashMap<String, f64>>,
}

impl ToneTriggerWords {
    pub fn by_bucket(&self, bucket: tone_core::Bucket) -> &[TriggerRecord] {
        match bucket {
            tone_core::Bucket::Clear => &self.clear,
            tone_core::Bucket::Caution => &self.caution,
            tone_core::Bucket::Alert => &self.alert,
        }
    }

    pub fn context_multiplier(&self, ctx: &str, trigger_type: &str) -> f64 {
        self.context_multipliers
            .get(ctx)
            .and_then(|m| m.get(trigger_type))
            .copied()
            .unwrap_or(1.0)
    }
}

// ---------------------------------------------------------------------
// intensityModifiers / sarcasmIndicators / negationIndicators /
// negationPatterns / phraseEdges
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntensityModifierPattern {
    pub pattern: String,
    #[serde(default)]
    pub level: String,
    #[serde(default = "default_one")]
    pub multiplier: f64,
}

pub type IntensityModifiersConfig = Vec<IntensityModifierPattern>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SarcasmIndicator {
    pub pattern: String,
    #[serde(default = "default_one")]
    pub confidence: f64,
}

pub type SarcasmIndicatorsConfig = Vec<SarcasmIndicator>;

/// Closed set of ~30 negation markers (spec §4.3).
pub type NegationIndicatorsConfig = Vec<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NegationPattern {
    pub pattern: String,
}

pub type NegationPatternsConfig = Vec<NegationPattern>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PhraseEdgePattern {
    pub pattern: String,
    pub category: String,
    #[serde(default = "default_one")]
    pub weight: f64,
}

pub type PhraseEdgesConfig = Vec<PhraseEdgePattern>;

// ---------------------------------------------------------------------
// tonePatterns
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TonePattern {
    #[serde(rename = "type")]
    pub kind: String, // "regex" | "phrase"
    pub pattern: String,
    pub tone: String,
    #[serde(default = "default_one")]
    pub confidence: f64,
    #[serde(default)]
    pub semantic_variants: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

pub type TonePatternsConfig = Vec<TonePattern>;

// ---------------------------------------------------------------------
// toneBucketMapping
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EligibilityConfig {
    #[serde(default)]
    pub require_phrase_level: bool,
    #[serde(default)]
    pub min_ngram: Option<usize>,
    #[serde(default)]
    pub exclude_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BaseBucketEntry {
    pub base: BucketTriple,
    #[serde(default)]
    pub eligibility: Option<EligibilityConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityShiftConfig {
    pub thresholds: (f64, f64),
    pub low: BucketTriple,
    pub med: BucketTriple,
    pub high: BucketTriple,
}

impl Default for IntensityShiftConfig {
    fn default() -> Self {
        Self {
            thresholds: (0.35, 0.7),
            low: BucketTriple::default(),
            med: BucketTriple::default(),
            high: BucketTriple::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToneBucketMapping {
    #[serde(default)]
    pub tone_buckets: HashMap<String, BaseBucketEntry>,
    #[serde(default)]
    pub context_overrides: HashMap<String, HashMap<String, BucketTriple>>,
    #[serde(default)]
    pub intensity_shifts: IntensityShiftConfig,
    #[serde(default)]
    pub attachment_overrides: HashMap<String, HashMap<String, BucketTriple>>,
    #[serde(default = "default_bucket")]
    pub default_bucket: String,
}

fn default_bucket() -> String {
    "clear".to_string()
}

// ---------------------------------------------------------------------
// weightModifiers
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: -1.0, max: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FallbackOrder {
    #[serde(default = "default_fallback_order")]
    pub order: Vec<String>,
}

fn default_fallback_order() -> Vec<String> {
    vec![
        "exact".to_string(),
        "alias".to_string(),
        "family".to_string(),
        "general".to_string(),
        "default".to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdviceRankOverrides {
    #[serde(default)]
    pub by_context: HashMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeightModifiers {
    #[serde(default)]
    pub by_context: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub alias_map: HashMap<String, String>,
    #[serde(default)]
    pub family_map: HashMap<String, String>,
    #[serde(default)]
    pub bounds: WeightBounds,
    #[serde(default)]
    pub fallbacks: FallbackOrder,
    #[serde(default)]
    pub advice_rank_overrides: AdviceRankOverrides,
}

// ---------------------------------------------------------------------
// guardrailConfig
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GuardrailConfig {
    #[serde(default)]
    pub block: Vec<String>,
    #[serde(default)]
    pub softeners: Vec<String>,
    #[serde(default)]
    pub deescalation_keywords: Vec<String>,
    #[serde(default)]
    pub absolute_you_should_patterns: Vec<String>,
}

// ---------------------------------------------------------------------
// profanityLexicons
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfanitySeverity {
    Mild,
    Moderate,
    Strong,
}

impl ProfanitySeverity {
    /// Alert-boost magnitude per spec §4.6 step 5.
    pub fn alert_boost(&self) -> f64 {
        match self {
            ProfanitySeverity::Mild => 0.1,
            ProfanitySeverity::Moderate => 0.2,
            ProfanitySeverity::Strong => 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Targeting {
    Any,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfanityCategory {
    pub severity: ProfanitySeverity,
    pub targeting: Targeting,
    pub trigger_words: Vec<String>,
}

pub type ProfanityLexiconsConfig = Vec<ProfanityCategory>;

// ---------------------------------------------------------------------
// attachmentOverrides (top-level blob; distinct from
// toneBucketMapping.attachmentOverrides)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentOverrideEntry {
    #[serde(default)]
    pub category_boost: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentOverridesConfig {
    #[serde(flatten)]
    pub by_style: HashMap<String, AttachmentOverrideEntry>,
}

// ---------------------------------------------------------------------
// attachmentToneWeights
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentToneWeightsOverride {
    #[serde(default)]
    pub category_multipliers: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentToneWeights {
    #[serde(default)]
    pub overrides: HashMap<String, AttachmentToneWeightsOverride>,
}

// ---------------------------------------------------------------------
// semanticThesaurus (optional)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SemanticCluster {
    pub terms: Vec<String>,
    #[serde(default)]
    pub bucket_nudge: HashMap<String, f64>,
    #[serde(default)]
    pub conf_delta: f64,
}

pub type SemanticThesaurusConfig = Vec<SemanticCluster>;

// ---------------------------------------------------------------------
// evaluationTones
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattParams {
    pub a: f64,
    pub b: f64,
}

impl Default for PlattParams {
    fn default() -> Self {
        // Identity-ish defaults: sigma(1*x + 0) is a reasonable neutral prior.
        Self { a: 1.0, b: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NliThresholds {
    #[serde(default = "default_entail_min")]
    pub entail_min: f64,
    #[serde(default = "default_contra_max")]
    pub contra_max: f64,
}

fn default_entail_min() -> f64 {
    0.55
}

fn default_contra_max() -> f64 {
    0.20
}

impl Default for NliThresholds {
    fn default() -> Self {
        Self {
            entail_min: default_entail_min(),
            contra_max: default_contra_max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EvaluationTonesConfig {
    #[serde(default)]
    pub platt: HashMap<String, PlattParams>,
    #[serde(default)]
    pub nli_thresholds: HashMap<String, NliThresholds>,
    #[serde(default)]
    pub min_confidence: HashMap<String, f64>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence_default: f64,
}

fn default_min_confidence() -> f64 {
    0.55
}

impl EvaluationTonesConfig {
    pub fn platt_for(&self, ctx: &str) -> PlattParams {
        self.platt.get(ctx).copied().unwrap_or_default()
    }

    pub fn nli_thresholds_for(&self, ctx: &str) -> NliThresholds {
        self.nli_thresholds.get(ctx).copied().unwrap_or_default()
    }

    pub fn min_confidence_for(&self, ctx: &str) -> f64 {
        self.min_confidence
            .get(ctx)
            .copied()
            .unwrap_or(self.min_confidence_default)
    }
}

// ---------------------------------------------------------------------
// learningSignals
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LearningSignalFeature {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub buckets: Vec<String>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub attachment_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemLearningSignal {
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub rejection_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AggregationConfig {
    #[serde(default)]
    pub window_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LearningSignalsConfig {
    #[serde(default)]
    pub features: Vec<LearningSignalFeature>,
    #[serde(default)]
    pub platt_adjust: HashMap<String, PlattParams>,
    #[serde(default)]
    pub by_item: HashMap<String, ItemLearningSignal>,
    #[serde(default)]
    pub noticings_map: HashMap<String, String>,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl LearningSignalsConfig {
    pub fn platt_adjust_for(&self, ctx: &str) -> PlattParams {
        self.platt_adjust.get(ctx).copied().unwrap_or_default()
    }
}
