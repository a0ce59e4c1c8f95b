//! `AttachmentEstimate` — the externally-maintained rolling attachment-style
//! estimate this core consumes but never computes (spec §1, §3).

use serde::{Deserialize, Serialize};

/// Attachment style dimension, as produced by the sibling attachment
/// estimator (out of scope here; this is a narrow consumer-facing type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStyle {
    Anxious,
    Avoidant,
    Disorganized,
    Secure,
}

impl AttachmentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentStyle::Anxious => "anxious",
            AttachmentStyle::Avoidant => "avoidant",
            AttachmentStyle::Disorganized => "disorganized",
            AttachmentStyle::Secure => "secure",
        }
    }
}

impl std::str::FromStr for AttachmentStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anxious" => Ok(AttachmentStyle::Anxious),
            "avoidant" => Ok(AttachmentStyle::Avoidant),
            "disorganized" => Ok(AttachmentStyle::Disorganized),
            "secure" => Ok(AttachmentStyle::Secure),
            _ => Err(()),
        }
    }
}

/// Per-dimension attachment scores, summing to approximately 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentScores {
    pub anxious: f64,
    pub avoidant: f64,
    pub disorganized: f64,
    pub secure: f64,
}

/// The consumed attachment estimate (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentEstimate {
    pub primary: AttachmentStyle,
    pub secondary: Option<AttachmentStyle>,
    pub confidence: f64,
    pub scores: AttachmentScores,
    pub days_observed: u32,
    pub total_signals: u32,
    pub window_complete: bool,
}

impl AttachmentEstimate {
    /// A neutral default used whenever the caller doesn't supply one
    /// (spec §6: `attachmentStyle='secure'` default on the public entry
    /// points).
    pub fn secure_default() -> Self {
        Self {
            primary: AttachmentStyle::Secure,
            secondary: None,
            confidence: 0.0,
            scores: AttachmentScores {
                secure: 1.0,
                ..Default::default()
            },
            days_observed: 0,
            total_signals: 0,
            window_complete: false,
        }
    }
}
