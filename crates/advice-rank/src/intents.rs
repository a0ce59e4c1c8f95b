//! `detectUserIntents(text)` (spec §4.12 step 4 "intent overlap bonus").
//!
//! The teacher's `text_processing::intent::IntentDetector` is a full
//! config-driven detector with regex slot extraction; all the ranker needs
//! is a small set of intent *labels* to overlap against `item.intents`, so
//! this is a much smaller keyword/pattern table in the same spirit, not a
//! port of that machinery.

/// `(intent, trigger phrases)` — a phrase matches if it appears anywhere in
/// the lowercased text. Order doesn't matter; results are deduped.
const INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("express_anger", &["so angry", "pisses me off", "furious", "sick of"]),
    ("express_sadness", &["so sad", "hurts so much", "heartbroken", "makes me cry"]),
    ("express_anxiety", &["so anxious", "worried that", "what if", "can't stop worrying"]),
    ("seek_validation", &["am i wrong", "tell me i'm", "is it just me", "does that make sense"]),
    ("seek_space", &["need space", "need some time", "need to be alone", "leave me alone"]),
    ("seek_reconnection", &["can we talk", "miss you", "want to reconnect", "can we fix this"]),
    ("express_withdrawal", &["don't want to talk", "shutting down", "i'm done talking"]),
    ("express_criticism", &["you always", "you never", "your fault"]),
    ("express_defensiveness", &["i didn't", "that's not fair", "i'm not the one"]),
    ("express_contempt", &["whatever", "i don't care what you think", "pathetic"]),
    ("express_gratitude", &["thank you", "thanks so much", "i appreciate"]),
    ("express_love", &["i love you", "love you so much"]),
    ("set_boundary", &["i need you to stop", "that's not okay with me", "i won't accept"]),
    ("apologize", &["i'm sorry", "i apologize", "my bad"]),
    ("request_change", &["can you please stop", "i wish you would", "could you start"]),
    ("express_confusion", &["i don't understand", "i'm confused about", "not sure what's happening"]),
    ("express_jealousy", &["makes me jealous", "insecure about"]),
    ("express_fear_of_abandonment", &["afraid you'll leave", "scared you'll leave", "don't leave me"]),
    ("seek_clarity", &["where do we stand", "what are we", "need clarity"]),
    ("express_overwhelm", &["so overwhelmed", "too much right now", "can't handle"]),
    ("express_loneliness", &["so alone", "feel so lonely"]),
    ("express_trust_issue", &["don't trust", "hard to trust"]),
    ("express_commitment", &["committed to us", "committed to this", "in this for the long run"]),
    ("express_doubt", &["not sure about us", "doubting this"]),
    ("de_escalate", &["let's calm down", "can we slow down", "let's take a breath"]),
    ("escalate", &["shut up", "don't talk to me like that"]),
    ("name_feeling", &["i feel like", "i feel so", "i'm feeling"]),
    ("ask_for_support", &["i need support", "can you support me", "i need help with"]),
    ("offer_support", &["i'm here for you", "how can i help", "i've got you"]),
    ("express_resentment", &["still mad about", "resent you for"]),
    ("express_hope", &["i hope we", "hoping things get better"]),
    ("express_hopelessness", &["nothing will change", "what's the point", "give up"]),
    ("acknowledge_impact", &["i see how that hurt", "i understand why you're upset"]),
    ("express_needs", &["i need you to", "what i need is"]),
    ("express_boundaries_violation", &["you crossed a line", "you broke my trust"]),
    ("seek_compromise", &["can we meet in the middle", "what if we both"]),
    ("express_pride", &["proud of us", "proud of you"]),
    ("express_regret", &["i regret", "wish i hadn't"]),
    ("check_in", &["how are you doing", "just checking in"]),
    ("reassure", &["it's going to be okay", "i'm not going anywhere"]),
];

/// Detect a deduped, sorted list of intent labels present in `text` (spec
/// §4.12: `detectUserIntents(text)` feeds the intent-overlap ranking bonus
/// and the NLI rules backstop).
pub fn detect_user_intents(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = INTENT_KEYWORDS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(intent, _)| intent.to_string())
        .collect();
    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_apology_and_boundary() {
        let intents = detect_user_intents("I'm sorry, but I need you to stop doing that.");
        assert!(intents.contains(&"apologize".to_string()));
        assert!(intents.contains(&"set_boundary".to_string()));
    }

    #[test]
    fn empty_when_nothing_matches() {
        assert!(detect_user_intents("the weather is mild today").is_empty());
    }

    #[test]
    fn results_are_deduped_and_sorted() {
        let intents = detect_user_intents("thank you, i appreciate you, thanks so much");
        assert_eq!(intents, vec!["express_gratitude".to_string()]);
    }
}
