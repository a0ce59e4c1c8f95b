//! Resolution of the ranking-score component weights `W` (spec §4.12 step
//! 4: "all adjustable per-context via `weightModifiers.adviceRankOverrides.
//! byContext` with delta bounds from `weightModifiers.bounds`").
//!
//! Resolution walks the fallback chain named in `weightModifiers.fallbacks`
//! (`exact, alias, family, general, default`) looking for the first context
//! key that has an override table, then adds each named delta (clamped to
//! `weightModifiers.bounds`) on top of the built-in defaults. Mirrors the
//! `FallbackOrder`/`alias_map`/`family_map` shape tone-config already
//! defines for this purpose.

use std::collections::HashMap;
use tone_config::WeightModifiers;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSet {
    pub base_confidence: f64,
    pub tone_match: f64,
    pub context_match: f64,
    pub context_link_multiplier: f64,
    pub attachment_match: f64,
    pub intensity_boost: f64,
    pub negation_penalty: f64,
    pub sarcasm_penalty: f64,
    pub phrase_edge_boost: f64,
    pub user_pref_boost: f64,
    pub second_person_boost: f64,
    pub severity_fit_weight: f64,
    pub premium_boost: f64,
    pub actionability_bonus: f64,
    pub intent_overlap_per_match: f64,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            base_confidence: 1.0,
            tone_match: 1.0,
            context_match: 0.3,
            context_link_multiplier: 1.0,
            attachment_match: 0.2,
            intensity_boost: 0.3,
            negation_penalty: -0.3,
            sarcasm_penalty: -0.2,
            phrase_edge_boost: 0.2,
            user_pref_boost: 0.3,
            second_person_boost: 0.15,
            severity_fit_weight: 0.2,
            premium_boost: 0.1,
            actionability_bonus: 0.1,
            intent_overlap_per_match: 0.6,
        }
    }
}

impl WeightSet {
    fn component(&self, name: &str) -> Option<f64> {
        Some(match name {
            "baseConfidence" => self.base_confidence,
            "toneMatch" => self.tone_match,
            "contextMatch" => self.context_match,
            "contextLinkMultiplier" => self.context_link_multiplier,
            "attachmentMatch" => self.attachment_match,
            "intensityBoost" => self.intensity_boost,
            "negationPenalty" => self.negation_penalty,
            "sarcasmPenalty" => self.sarcasm_penalty,
            "phraseEdgeBoost" => self.phrase_edge_boost,
            "userPrefBoost" => self.user_pref_boost,
            "secondPersonBoost" => self.second_person_boost,
            "severityFitWeight" => self.severity_fit_weight,
            "premiumBoost" => self.premium_boost,
            "actionabilityBonus" => self.actionability_bonus,
            "intentOverlapPerMatch" => self.intent_overlap_per_match,
            _ => return None,
        })
    }

    fn set_component(&mut self, name: &str, value: f64) {
        match name {
            "baseConfidence" => self.base_confidence = value,
            "toneMatch" => self.tone_match = value,
            "contextMatch" => self.context_match = value,
            "contextLinkMultiplier" => self.context_link_multiplier = value,
            "attachmentMatch" => self.attachment_match = value,
            "intensityBoost" => self.intensity_boost = value,
            "negationPenalty" => self.negation_penalty = value,
            "sarcasmPenalty" => self.sarcasm_penalty = value,
            "phraseEdgeBoost" => self.phrase_edge_boost = value,
            "userPrefBoost" => self.user_pref_boost = value,
            "secondPersonBoost" => self.second_person_boost = value,
            "severityFitWeight" => self.severity_fit_weight = value,
            "premiumBoost" => self.premium_boost = value,
            "actionabilityBonus" => self.actionability_bonus = value,
            "intentOverlapPerMatch" => self.intent_overlap_per_match = value,
            _ => {}
        }
    }
}

fn resolve_context_key<'a>(ctx: &'a str, modifiers: &'a WeightModifiers, disable_fallbacks: bool) -> Option<String> {
    if modifiers.advice_rank_overrides.by_context.contains_key(ctx) {
        return Some(ctx.to_string());
    }
    if disable_fallbacks {
        return None;
    }
    for step in &modifiers.fallbacks.order {
        let candidate = match step.as_str() {
            "exact" => Some(ctx.to_string()),
            "alias" => modifiers.alias_map.get(ctx).cloned(),
            "family" => modifiers.family_map.get(ctx).cloned(),
            "general" => Some("general".to_string()),
            "default" => None,
            _ => None,
        };
        if let Some(key) = candidate {
            if modifiers.advice_rank_overrides.by_context.contains_key(&key) {
                if step != "exact" {
                    tracing::debug!(context = ctx, via = step.as_str(), resolved = %key, "weights.fallback.suggestions");
                }
                return Some(key);
            }
        }
    }
    None
}

/// Resolve the final `WeightSet` for `ctx`, applying `weightModifiers`'
/// fallback chain and delta bounds (spec §4.12 step 4, §6
/// `DISABLE_WEIGHT_FALLBACKS`).
pub fn resolve(ctx: &str, modifiers: &WeightModifiers, disable_fallbacks: bool) -> WeightSet {
    let mut weights = WeightSet::default();
    let Some(key) = resolve_context_key(ctx, modifiers, disable_fallbacks) else {
        return weights;
    };
    let Some(deltas): Option<&HashMap<String, f64>> = modifiers.advice_rank_overrides.by_context.get(&key) else {
        return weights;
    };
    for (name, delta) in deltas {
        if let Some(base) = weights.component(name) {
            let clamped_delta = delta.clamp(modifiers.bounds.min, modifiers.bounds.max);
            weights.set_component(name, base + clamped_delta);
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::{AdviceRankOverrides, FallbackOrder, WeightBounds};

    fn modifiers_with_override(ctx: &str, component: &str, delta: f64) -> WeightModifiers {
        let mut by_context = HashMap::new();
        let mut deltas = HashMap::new();
        deltas.insert(component.to_string(), delta);
        by_context.insert(ctx.to_string(), deltas);
        WeightModifiers {
            advice_rank_overrides: AdviceRankOverrides { by_context },
            bounds: WeightBounds::default(),
            fallbacks: FallbackOrder::default(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_used_when_no_override_present() {
        let weights = resolve("general", &WeightModifiers::default(), false);
        assert_eq!(weights, WeightSet::default());
    }

    #[test]
    fn exact_context_override_applies_delta() {
        let modifiers = modifiers_with_override("conflict", "toneMatch", 0.2);
        let weights = resolve("conflict", &modifiers, false);
        assert!((weights.tone_match - 1.2).abs() < 1e-9);
    }

    #[test]
    fn delta_is_clamped_to_bounds() {
        let mut modifiers = modifiers_with_override("conflict", "toneMatch", 5.0);
        modifiers.bounds = WeightBounds { min: -1.0, max: 1.0 };
        let weights = resolve("conflict", &modifiers, false);
        assert!((weights.tone_match - 2.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_general_when_no_exact_match() {
        let modifiers = modifiers_with_override("general", "attachmentMatch", 0.1);
        let weights = resolve("some_unseen_ctx", &modifiers, false);
        assert!((weights.attachment_match - 0.3).abs() < 1e-9);
    }

    #[test]
    fn disabling_fallbacks_keeps_defaults_on_miss() {
        let modifiers = modifiers_with_override("general", "attachmentMatch", 0.1);
        let weights = resolve("some_unseen_ctx", &modifiers, true);
        assert_eq!(weights, WeightSet::default());
    }
}
