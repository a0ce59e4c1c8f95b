//! Intensity modifiers: config-driven intensifier/downtoner patterns that
//! scale whatever detector hit they sit next to (spec §4.5 feature
//! `intensityMultiplier`).

use tone_config::IntensityModifiersConfig;
use tone_core::{Token, TokenSpan};

#[derive(Debug, Clone, PartialEq)]
pub struct IntensityHit {
    pub word: String,
    pub level: String,
    pub multiplier: f64,
    pub scope: TokenSpan,
}

pub fn compile(cfg: &IntensityModifiersConfig) -> Vec<(regex::Regex, String, f64)> {
    cfg.iter()
        .filter_map(|m| {
            regex::RegexBuilder::new(&m.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    tracing::warn!(pattern = %m.pattern, error = %e, "nlp.intensity.pattern.invalid");
                    e
                })
                .ok()
                .map(|re| (re, m.level.clone(), m.multiplier))
        })
        .collect()
}

/// Find every intensifier hit in the token stream, scoping each to the
/// matched token through the next token (the word it's presumed to modify).
pub fn detect(tokens: &[Token], compiled: &[(regex::Regex, String, f64)]) -> Vec<IntensityHit> {
    let mut hits = Vec::new();
    for (idx, tok) in tokens.iter().enumerate() {
        for (re, level, multiplier) in compiled {
            if re.is_match(&tok.text) {
                let end = (idx + 1).min(tokens.len().saturating_sub(1));
                hits.push(IntensityHit {
                    word: tok.text.clone(),
                    level: level.clone(),
                    multiplier: *multiplier,
                    scope: TokenSpan { start: idx, end },
                });
            }
        }
    }
    hits
}

/// Combined multiplier across all hits (spec §4.5: multipliers compound
/// multiplicatively, clamped to avoid runaway scores).
pub fn aggregate_multiplier(hits: &[IntensityHit]) -> f64 {
    hits.iter()
        .fold(1.0_f64, |acc, h| acc * h.multiplier)
        .clamp(0.1, 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;
    use tone_config::IntensityModifierPattern;

    #[test]
    fn detects_and_aggregates_intensifiers() {
        let cfg = vec![IntensityModifierPattern {
            pattern: "^(really|very)$".to_string(),
            level: "high".to_string(),
            multiplier: 1.5,
        }];
        let compiled = compile(&cfg);
        let toks = tokenize("you are really very upset");
        let hits = detect(&toks, &compiled);
        assert_eq!(hits.len(), 2);
        assert!((aggregate_multiplier(&hits) - 2.25).abs() < 1e-9);
    }

    #[test]
    fn no_hits_yields_neutral_multiplier() {
        assert_eq!(aggregate_multiplier(&[]), 1.0);
    }
}
