//! Contraindications + advanced guardrail battery (spec §4.12 step 1).
//!
//! Applied before anything is scored: every surviving candidate is one the
//! ranker is willing to ever surface, regardless of how well it scores.

use crate::profanity::{self, ProfanityScan};
use aho_corasick::AhoCorasickBuilder;
use tone_config::GuardrailConfig;
use tone_core::{AdviceItem, Bucket, CompactDoc};

const CONFRONTATION_INTENSITY_MIN: f64 = 0.75;
const ALERT_OR_INTENSITY_SOFTENER_MIN: f64 = 0.7;
const INTENSITY_BLOCK_CONFRONTATIONAL_MIN: f64 = 0.8;
const INTENSITY_REQUIRE_GENTLE_MIN: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailReject {
    ConfrontationAtHighIntensity,
    NegationSensitive,
    BlockedTerm,
    ContextInappropriate,
    MissingDeescalationKeyword,
    AbsoluteYouShouldPattern,
    MissingSoftener,
    ConfrontationalAtHighIntensity,
    MissingGentleLanguage,
}

impl GuardrailReject {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardrailReject::ConfrontationAtHighIntensity => "confrontation_at_high_intensity",
            GuardrailReject::NegationSensitive => "negation_sensitive",
            GuardrailReject::BlockedTerm => "blocked_term",
            GuardrailReject::ContextInappropriate => "context_inappropriate",
            GuardrailReject::MissingDeescalationKeyword => "missing_deescalation_keyword",
            GuardrailReject::AbsoluteYouShouldPattern => "absolute_you_should_pattern",
            GuardrailReject::MissingSoftener => "missing_softener",
            GuardrailReject::ConfrontationalAtHighIntensity => "confrontational_at_high_intensity",
            GuardrailReject::MissingGentleLanguage => "missing_gentle_language",
        }
    }
}

pub struct GuardrailContext<'a> {
    pub text: &'a str,
    pub doc: &'a CompactDoc,
    pub context: &'a str,
    pub intensity: f64,
    pub has_negation: bool,
    pub primary_bucket: Bucket,
    pub guardrail: &'a GuardrailConfig,
    pub profanity_lexicon: &'a tone_config::ProfanityLexiconsConfig,
}

fn contains_any(advice_lower: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| !t.is_empty() && advice_lower.contains(&t.to_lowercase()))
}

fn matches_any_pattern(advice: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| {
        regex::RegexBuilder::new(p)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(advice))
            .unwrap_or(false)
    })
}

/// `true` if `advice` contains any `guardrail.block` term, checked with a
/// single Aho-Corasick automaton over the whole block list (spec §4.12:
/// "blocked-pattern regex (AC-accelerated)").
fn contains_blocked_term(advice_lower: &str, block: &[String]) -> bool {
    if block.is_empty() {
        return false;
    }
    match AhoCorasickBuilder::new().ascii_case_insensitive(true).build(block) {
        Ok(automaton) => automaton.is_match(advice_lower),
        Err(e) => {
            tracing::warn!(error = %e, "advice_rank.guardrail.automaton_build_failed");
            false
        }
    }
}

/// Evaluate one item against the full contraindications + guardrail battery.
/// Returns `Ok(profanity_scan)` when the item survives, `Err(reject_reason)`
/// otherwise.
pub fn evaluate(item: &AdviceItem, ctx: &GuardrailContext<'_>) -> Result<ProfanityScan, GuardrailReject> {
    if item.categories.iter().any(|c| c == "confrontation") && ctx.intensity > CONFRONTATION_INTENSITY_MIN {
        return Err(GuardrailReject::ConfrontationAtHighIntensity);
    }
    if item.negation_sensitive && ctx.has_negation {
        return Err(GuardrailReject::NegationSensitive);
    }

    let advice_lower = item.advice.to_lowercase();
    if contains_blocked_term(&advice_lower, &ctx.guardrail.block) {
        return Err(GuardrailReject::BlockedTerm);
    }

    if !item.matches_context(ctx.context) {
        return Err(GuardrailReject::ContextInappropriate);
    }

    if ctx.primary_bucket == Bucket::Alert {
        if !ctx.guardrail.deescalation_keywords.is_empty()
            && !contains_any(&advice_lower, &ctx.guardrail.deescalation_keywords)
        {
            return Err(GuardrailReject::MissingDeescalationKeyword);
        }
        if matches_any_pattern(&item.advice, &ctx.guardrail.absolute_you_should_patterns) {
            return Err(GuardrailReject::AbsoluteYouShouldPattern);
        }
    }

    if (ctx.primary_bucket == Bucket::Alert || ctx.intensity >= ALERT_OR_INTENSITY_SOFTENER_MIN)
        && !ctx.guardrail.softeners.is_empty()
        && !contains_any(&advice_lower, &ctx.guardrail.softeners)
    {
        return Err(GuardrailReject::MissingSoftener);
    }

    if ctx.intensity >= INTENSITY_BLOCK_CONFRONTATIONAL_MIN
        && matches_any_pattern(&item.advice, &ctx.guardrail.absolute_you_should_patterns)
    {
        return Err(GuardrailReject::ConfrontationalAtHighIntensity);
    }
    if ctx.intensity >= INTENSITY_REQUIRE_GENTLE_MIN
        && item.trigger_tone != Bucket::Clear
        && !ctx.guardrail.softeners.is_empty()
        && !contains_any(&advice_lower, &ctx.guardrail.softeners)
    {
        return Err(GuardrailReject::MissingGentleLanguage);
    }

    Ok(profanity::scan(ctx.text, ctx.doc, ctx.profanity_lexicon))
}
