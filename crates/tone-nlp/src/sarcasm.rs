//! Sarcasm heuristic (spec §4.3): config-driven regex indicators, each
//! carrying its own confidence; the highest-confidence hit wins.

use tone_config::SarcasmIndicatorsConfig;
use tone_core::Sarcasm;

pub fn compile(indicators: &SarcasmIndicatorsConfig) -> Vec<(regex::Regex, f64)> {
    indicators
        .iter()
        .filter_map(|ind| {
            regex::RegexBuilder::new(&ind.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    tracing::warn!(pattern = %ind.pattern, error = %e, "nlp.sarcasm.pattern.invalid");
                    e
                })
                .ok()
                .map(|re| (re, ind.confidence))
        })
        .collect()
}

pub fn detect(text: &str, compiled: &[(regex::Regex, f64)]) -> Sarcasm {
    let best = compiled
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, conf)| *conf)
        .fold(0.0_f64, f64::max);
    Sarcasm {
        present: best > 0.0,
        score: best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::SarcasmIndicator;

    #[test]
    fn detects_configured_pattern() {
        let cfg = vec![SarcasmIndicator {
            pattern: r"oh (great|wonderful)".to_string(),
            confidence: 0.8,
        }];
        let compiled = compile(&cfg);
        let r = detect("oh great, another one", &compiled);
        assert!(r.present);
        assert!((r.score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn absent_when_no_pattern_matches() {
        let compiled = compile(&[]);
        let r = detect("thanks for listening", &compiled);
        assert!(!r.present);
        assert_eq!(r.score, 0.0);
    }
}
