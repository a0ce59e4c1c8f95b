//! Integration tests for the concrete scenarios enumerated in spec §8,
//! driven end-to-end through the public `SuggestionsService` API rather
//! than any individual component.

use std::collections::HashMap;
use tone_core::Bucket;
use tone_service::{AnalyzeOptions, SuggestionOptions, SuggestionsService, UserProfile};

fn advice_item(id: &str, advice: &str, trigger_tone: &str, contexts: &[&str], categories: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "advice": advice,
        "trigger_tone": trigger_tone,
        "contexts": contexts,
        "attachment_styles": [],
        "severity_threshold": {},
        "categories": categories,
        "intents": [],
        "context_link": [],
        "patterns": [],
        "tags": [],
        "style_tuning": {},
        "boost_sources": [],
        "keywords": [],
        "negation_sensitive": false
    })
}

fn service() -> SuggestionsService {
    let mut raw = HashMap::new();
    raw.insert(
        "therapyAdvice".to_string(),
        serde_json::json!([
            advice_item(
                "alert-1",
                "pause, take a breath, and name the feeling before you respond",
                "alert",
                &[],
                &["de-escalation"]
            ),
            advice_item("clear-1", "keep celebrating what went well together", "clear", &[], &["appreciation"]),
            {
                let mut v = advice_item(
                    "repair-specific",
                    "name one small thing you'd like to revisit together",
                    "clear",
                    &["repair"],
                    &["repair"]
                );
                v["context_link"] = serde_json::json!(["repair"]);
                v
            },
            advice_item(
                "repair-generic",
                "share how you are feeling using a calm, simple sentence",
                "clear",
                &[],
                &["communication"]
            ),
        ]),
    );
    raw.insert(
        "toneTriggerWords".to_string(),
        serde_json::json!({
            "alert": [
                {"text": "stupid", "intensity": 0.9, "type": "phrase"},
                {"text": "shut up", "intensity": 0.95, "type": "phrase"}
            ],
            "clear": [
                {"text": "thank you", "intensity": 0.6, "type": "phrase"},
                {"text": "great job", "intensity": 0.6, "type": "phrase"}
            ]
        }),
    );
    raw.insert(
        "toneBucketMapping".to_string(),
        serde_json::json!({
            "tone_buckets": {
                "angry": {"base": {"clear": 0.03, "caution": 0.12, "alert": 0.85}},
                "frustrated": {"base": {"clear": 0.05, "caution": 0.35, "alert": 0.6}},
                "anxious": {"base": {"clear": 0.15, "caution": 0.6, "alert": 0.25}},
                "sad": {"base": {"clear": 0.2, "caution": 0.55, "alert": 0.25}},
                "positive": {"base": {"clear": 0.92, "caution": 0.06, "alert": 0.02}},
                "supportive": {"base": {"clear": 0.9, "caution": 0.08, "alert": 0.02}},
                "assertive": {"base": {"clear": 0.55, "caution": 0.35, "alert": 0.1}},
                "neutral": {"base": {"clear": 0.7, "caution": 0.25, "alert": 0.05}}
            },
            "default_bucket": "neutral"
        }),
    );
    raw.insert("contextClassifier".to_string(), serde_json::json!({}));
    raw.insert(
        "guardrailConfig".to_string(),
        serde_json::json!({
            "block": [],
            "softeners": ["breath", "pause", "gentle", "maybe", "i feel"],
            "deescalation_keywords": ["breath", "pause", "name the feeling"],
            "absolute_you_should_patterns": ["you should"]
        }),
    );
    let config = tone_config::ConfigProvider::from_blobs(raw).unwrap();
    SuggestionsService::new(config, None).unwrap()
}

/// Scenario 1 (spec §8.1): targeted profanity + imperative reads as
/// `alert`, and the ranked suggestions never surface a "you should"
/// rewrite, with at least one de-escalation item present.
#[tokio::test]
async fn scenario_targeted_profanity_is_alert_with_deescalation_advice() {
    let service = service();
    let text = "You are being so stupid, shut up!";
    let analyze_options = AnalyzeOptions {
        context: "conflict".to_string(),
        ..AnalyzeOptions::default()
    };
    let tone = service.analyze_tone(text, &analyze_options);
    assert_eq!(tone.ui_tone, Bucket::Alert, "dist = {:?}", tone.ui_distribution);
    assert!(tone.ui_distribution.alert > tone.ui_distribution.caution);
    assert!(tone.ui_distribution.caution > 0.4 || tone.ui_distribution.alert > 0.4);

    let profile = UserProfile::default();
    let options = SuggestionOptions {
        full_tone_analysis: Some(tone),
        ..SuggestionOptions::default()
    };
    let out = service.generate_advanced_suggestions(text, "conflict", &profile, &options).await.unwrap();

    assert!(!out.suggestions.is_empty());
    assert!(out.suggestions.iter().any(|s| s.category == "de-escalation"));
    assert!(!out.suggestions.iter().any(|s| s.text.to_lowercase().contains("you should")));
}

/// Scenario 2 (spec §8.2): a compliment reads as `clear` with the
/// compliment veto keeping `pAlert` low, and any suggestions returned are
/// affirming rather than corrective.
#[tokio::test]
async fn scenario_compliment_is_clear_with_low_alert_probability() {
    let service = service();
    let text = "Thank you so much, you did a great job!";
    let analyze_options = AnalyzeOptions::default();
    let tone = service.analyze_tone(text, &analyze_options);
    assert_eq!(tone.ui_tone, Bucket::Clear, "dist = {:?}", tone.ui_distribution);
    assert!(tone.ui_distribution.alert <= 0.15 + 1e-9);

    let profile = UserProfile::default();
    let options = SuggestionOptions {
        full_tone_analysis: Some(tone),
        ..SuggestionOptions::default()
    };
    let out = service.generate_advanced_suggestions(text, "general", &profile, &options).await.unwrap();
    assert!(out.suggestions.iter().all(|s| ["appreciation", "affection", "support"].contains(&s.category.as_str())));
}

/// Scenario 3 (spec §8.3): a tentative repair-context message stays out of
/// `alert`, has low intensity, and ranks the `repair`-scoped advice item
/// above the context-agnostic one.
#[tokio::test]
async fn scenario_tentative_repair_message_ranks_context_match_first() {
    let service = service();
    let text = "Maybe we could try to talk about this later?";
    let analyze_options = AnalyzeOptions {
        context: "repair".to_string(),
        attachment_style: "anxious".to_string(),
        ..AnalyzeOptions::default()
    };
    let tone = service.analyze_tone(text, &analyze_options);
    assert!(matches!(tone.ui_tone, Bucket::Clear | Bucket::Caution), "ui_tone = {:?}", tone.ui_tone);
    assert!(tone.intensity < 0.35, "intensity = {}", tone.intensity);

    let profile = UserProfile::default();
    let options = SuggestionOptions {
        attachment_style: "anxious".to_string(),
        full_tone_analysis: Some(tone),
        ..SuggestionOptions::default()
    };
    let out = service.generate_advanced_suggestions(text, "repair", &profile, &options).await.unwrap();

    let repair_pos = out.suggestions.iter().position(|s| s.id == "repair-specific");
    let generic_pos = out.suggestions.iter().position(|s| s.id == "repair-generic");
    if let (Some(r), Some(g)) = (repair_pos, generic_pos) {
        assert!(r < g, "expected repair-scoped item ranked above context-agnostic item: {:?}", out.suggestions);
    } else {
        assert!(repair_pos.is_some(), "repair-scoped item should survive ranking at all: {:?}", out.suggestions);
    }
}

/// `analyzeTone` is idempotent across repeated calls with identical config
/// and input (spec §8 invariant), whether served from cache or recomputed.
#[test]
fn analyze_tone_is_byte_for_byte_idempotent() {
    let service = service();
    let options = AnalyzeOptions::default();
    let a = service.analyze_tone("I'm worried about how this will land", &options);
    let b = service.analyze_tone("I'm worried about how this will land", &options);
    assert_eq!(a, b);
}
