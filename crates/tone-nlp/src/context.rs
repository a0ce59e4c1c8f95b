//! Context classifier (spec §4.3/§4.4: which relationship context — e.g.
//! `"conflict"`, `"repair"`, `"general"` — a message best fits), a phrase-
//! weighted scorer over `contextClassifier` config, generalized from the
//! donor's config-driven intent matcher.

use tone_core::ContextResult;
use tone_config::ContextClassifierConfig;

const GENERAL_LABEL: &str = "general";

/// Score every configured context against `text_lower` (already
/// lowercased/normalized by the caller) by summing phrase weights for every
/// substring hit, then rank and pick a primary/secondary pair.
pub fn classify(text_lower: &str, cfg: &ContextClassifierConfig) -> ContextResult {
    let mut scored: Vec<(String, f64)> = Vec::new();

    for ctx in &cfg.contexts {
        let mut score = 0.0;
        for phrase in &ctx.phrases {
            if phrase.text.is_empty() {
                continue;
            }
            if text_lower.contains(&phrase.text.to_lowercase()) {
                score += phrase.weight;
            }
        }
        if score > 0.0 {
            scored.push((ctx.name.clone(), score));
        }
    }

    if scored.is_empty() {
        return ContextResult {
            label: GENERAL_LABEL.to_string(),
            score: 0.0,
            secondary: None,
            confidence: 0.0,
            ranked: vec![(GENERAL_LABEL.to_string(), 0.0)],
        };
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let total: f64 = scored.iter().map(|(_, s)| s).sum();
    let (label, score) = scored[0].clone();
    let secondary = scored.get(1).map(|(l, _)| l.clone());
    let confidence = if total > 0.0 { score / total } else { 0.0 };

    ContextResult {
        label,
        score,
        secondary,
        confidence,
        ranked: scored,
    }
}
