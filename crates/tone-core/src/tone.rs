//! `ToneScore` — the output of the rule-weighted emotion scorer plus its
//! meta-classifier head (spec §3, §4.6).

use serde::{Deserialize, Serialize};

/// Per-emotion additive scores, pre-softmax unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EmotionScores {
    pub neutral: f64,
    pub positive: f64,
    pub supportive: f64,
    pub anxious: f64,
    pub angry: f64,
    pub frustrated: f64,
    pub sad: f64,
    pub assertive: f64,
}

impl EmotionScores {
    pub const LABELS: [&'static str; 8] = [
        "neutral",
        "positive",
        "supportive",
        "anxious",
        "angry",
        "frustrated",
        "sad",
        "assertive",
    ];

    pub fn get(&self, label: &str) -> f64 {
        match label {
            "neutral" => self.neutral,
            "positive" => self.positive,
            "supportive" => self.supportive,
            "anxious" => self.anxious,
            "angry" => self.angry,
            "frustrated" => self.frustrated,
            "sad" => self.sad,
            "assertive" => self.assertive,
            _ => 0.0,
        }
    }

    pub fn add(&mut self, label: &str, delta: f64) {
        match label {
            "neutral" => self.neutral += delta,
            "positive" => self.positive += delta,
            "supportive" => self.supportive += delta,
            "anxious" => self.anxious += delta,
            "angry" => self.angry += delta,
            "frustrated" => self.frustrated += delta,
            "sad" => self.sad += delta,
            "assertive" => self.assertive += delta,
            _ => {}
        }
    }

    /// Numerically-stabilized softmax over the eight emotion channels,
    /// returning a new set of scores that sum to 1 (spec §4.6 step 9).
    pub fn softmax(&self) -> EmotionScores {
        let raw = [
            self.neutral,
            self.positive,
            self.supportive,
            self.anxious,
            self.angry,
            self.frustrated,
            self.sad,
            self.assertive,
        ];
        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = raw.iter().map(|v| (v - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        let sum = if sum <= 0.0 { 1.0 } else { sum };
        EmotionScores {
            neutral: exps[0] / sum,
            positive: exps[1] / sum,
            supportive: exps[2] / sum,
            anxious: exps[3] / sum,
            angry: exps[4] / sum,
            frustrated: exps[5] / sum,
            sad: exps[6] / sum,
            assertive: exps[7] / sum,
        }
    }

    /// The label with the highest score; ties broken by declaration order
    /// (first wins), mirroring `EmotionScores::LABELS` order.
    pub fn argmax_label(&self) -> &'static str {
        let raw = [
            ("neutral", self.neutral),
            ("positive", self.positive),
            ("supportive", self.supportive),
            ("anxious", self.anxious),
            ("angry", self.angry),
            ("frustrated", self.frustrated),
            ("sad", self.sad),
            ("assertive", self.assertive),
        ];
        let mut best = raw[0];
        for entry in &raw[1..] {
            if entry.1 > best.1 {
                best = *entry;
            }
        }
        best.0
    }
}

/// The meta-classifier's two calibration-bound probabilities (spec §4.6
/// step 6): these flow to `BucketMapper`/`Calibrator` and never
/// double-count back into `EmotionScores`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MetaClassifier {
    pub p_alert: f64,
    pub p_caution: f64,
}

/// Output of `ToneScorer` (spec §3, §4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneScore {
    pub scores: EmotionScores,
    pub intensity: f64,
    pub confidence: f64,
    pub meta_classifier: MetaClassifier,
    pub signals: Vec<String>,
    pub explanation: Vec<String>,
    /// `EmotionScores::argmax_label()` at the time of scoring.
    pub classification: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let mut s = EmotionScores::default();
        s.add("angry", 3.0);
        s.add("sad", 1.0);
        let sm = s.softmax();
        let total = sm.neutral
            + sm.positive
            + sm.supportive
            + sm.anxious
            + sm.angry
            + sm.frustrated
            + sm.sad
            + sm.assertive;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn argmax_label_picks_highest() {
        let mut s = EmotionScores::default();
        s.add("supportive", 2.0);
        s.add("angry", 0.5);
        assert_eq!(s.argmax_label(), "supportive");
    }
}
