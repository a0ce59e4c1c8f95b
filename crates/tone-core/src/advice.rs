//! `AdviceItem` — a single therapy-advice micro-suggestion in the corpus
//! (spec §3).

use crate::bucket::Bucket;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A therapy-advice corpus entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceItem {
    pub id: String,
    pub advice: String,
    pub trigger_tone: Bucket,
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub attachment_styles: Vec<String>,
    /// Per-bucket minimum severity in `[0,1]` required for this item to be
    /// eligible (spec §3, used by the soft severity gate in §4.10 and the
    /// `severityFit` term in §4.12).
    #[serde(default)]
    pub severity_threshold: HashMap<String, f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub intents: Vec<String>,
    #[serde(default)]
    pub context_link: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Per-attachment-style multiplicative tuning (spec §4.10's
    /// "attachment style-tuning").
    #[serde(default)]
    pub style_tuning: HashMap<String, f64>,
    #[serde(default)]
    pub boost_sources: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// `true` if the advice text is itself sensitive to active negation
    /// scopes (spec §4.12 contraindications: "drop negationSensitive items").
    #[serde(default)]
    pub negation_sensitive: bool,
}

impl AdviceItem {
    pub fn severity_threshold_for(&self, bucket: Bucket) -> Option<f64> {
        self.severity_threshold.get(bucket.as_str()).copied()
    }

    /// `true` when `contexts` is empty (matches anything) or contains `ctx`.
    pub fn matches_context(&self, ctx: &str) -> bool {
        self.contexts.is_empty() || self.contexts.iter().any(|c| c == ctx)
    }

    /// `true` when `attachment_styles` is empty (matches anything) or
    /// contains `style`.
    pub fn matches_attachment(&self, style: &str) -> bool {
        self.attachment_styles.is_empty() || self.attachment_styles.iter().any(|s| s == style)
    }

    /// Lowercased, ≥3-char word set, for Jaccard duplicate-penalty
    /// computation (spec §4.12 step 6).
    pub fn word_set(&self) -> std::collections::HashSet<String> {
        self.advice
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|w| w.chars().count() >= 3)
            .collect()
    }
}

/// A tagged suggestion kind (spec §9 "dynamic dispatch" design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Rewrite,
    MicroAdvice,
}

/// One ranked suggestion returned to the caller (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub text: String,
    pub confidence: f64,
    pub reason: String,
    pub category: String,
    pub priority: u32,
    pub context_specific: bool,
    pub attachment_informed: bool,
    pub suggestion_type: SuggestionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> AdviceItem {
        AdviceItem {
            id: "a1".into(),
            advice: "Try naming the feeling before reacting".into(),
            trigger_tone: Bucket::Caution,
            contexts: vec!["repair".into()],
            attachment_styles: vec![],
            severity_threshold: HashMap::new(),
            categories: vec!["de-escalation".into()],
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

    #[test]
    fn context_match_is_open_when_empty_and_closed_otherwise() {
        let it = item();
        assert!(it.matches_context("repair"));
        assert!(!it.matches_context("conflict"));
        assert!(it.matches_attachment("anything"));
    }

    #[test]
    fn word_set_drops_short_words() {
        let it = item();
        let ws = it.word_set();
        assert!(ws.contains("naming"));
        assert!(ws.contains("feeling"));
        assert!(!ws.contains("the"));
    }
}
