//! Tokenizer, sentence splitter, and heuristic POS/lemma tagging.
//!
//! This is the "local" half of the NLP split (spec §4.3 C3 LocalNHP):
//! fast, dependency-free, and good enough to drive negation scoping and
//! second-person detection without a real parser.

use once_cell::sync::Lazy;
use regex::Regex;
use tone_core::{Pos, Span, Token};
use unicode_segmentation::UnicodeSegmentation;

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[.!?]+)(?:\s+|$)").expect("sentence boundary pattern is valid")
});

static PRONOUNS_1P_3P: Lazy<std::collections::HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "he", "him",
        "his", "himself", "she", "her", "hers", "herself", "they", "them", "their", "theirs",
        "themselves", "it", "its", "itself",
    ]
    .into_iter()
    .collect()
});

/// Second-person pronoun closed set (spec §4.5: "second-person entity
/// tagging" uses this set before falling back to dependency heuristics).
pub static PRONOUNS_2P: Lazy<std::collections::HashSet<&'static str>> =
    Lazy::new(|| ["you", "your", "yours", "yourself", "yourselves", "u", "ur"].into_iter().collect());

static AUX_VERBS: Lazy<std::collections::HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
        "must",
    ]
    .into_iter()
    .collect()
});

fn is_punct(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| !c.is_alphanumeric())
}

fn looks_adverb(word: &str) -> bool {
    word.len() > 3 && word.ends_with("ly")
}

fn looks_verb(word: &str) -> bool {
    (word.len() > 4 && (word.ends_with("ing") || word.ends_with("ed"))) || AUX_VERBS.contains(word)
}

fn looks_adjective(word: &str) -> bool {
    word.len() > 4 && (word.ends_with("ful") || word.ends_with("ous") || word.ends_with("ive") || word.ends_with("able"))
}

fn naive_lemma(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ing").filter(|s| s.len() >= 3) {
        return stem.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies").filter(|s| !s.is_empty()) {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("ed").filter(|s| s.len() >= 3) {
        return stem.to_string();
    }
    if let Some(stem) = word.strip_suffix('s').filter(|s| s.len() >= 3 && !word.ends_with("ss")) {
        return stem.to_string();
    }
    word.to_string()
}

fn tag_pos(word_lower: &str, is_punct_tok: bool, capitalized_mid_sentence: bool) -> Pos {
    if is_punct_tok {
        Pos::Punct
    } else if AUX_VERBS.contains(word_lower) {
        Pos::Aux
    } else if PRONOUNS_2P.contains(word_lower) || PRONOUNS_1P_3P.contains(word_lower) {
        Pos::Pron
    } else if capitalized_mid_sentence {
        Pos::Propn
    } else if looks_verb(word_lower) {
        Pos::Verb
    } else if looks_adverb(word_lower) {
        Pos::Adv
    } else if looks_adjective(word_lower) {
        Pos::Adj
    } else {
        Pos::Noun
    }
}

/// Split `text` into sentence char spans. Never returns zero spans for
/// non-empty input (falls back to the whole text as one sentence).
pub fn split_sentences(text: &str) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut spans = Vec::new();
    let mut start = 0usize;
    for m in SENTENCE_BOUNDARY.find_iter(text) {
        let end = m.end();
        if end > start {
            spans.push(Span { start, end });
        }
        start = end;
    }
    if start < text.chars().count() {
        spans.push(Span {
            start,
            end: text.chars().count(),
        });
    }
    if spans.is_empty() {
        spans.push(Span {
            start: 0,
            end: text.chars().count(),
        });
    }
    spans
}

/// Tokenize `text` into `Token`s with heuristic POS and a naive lemma.
/// Token `start`/`end` are char offsets (spec §3: "char offsets, not byte
/// offsets, so multi-byte UTF-8 doesn't desync spans").
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut char_idx = 0usize;
    let mut token_idx = 0usize;
    let mut seen_word = false;

    for word in text.split_word_bounds() {
        let start = char_idx;
        let len = word.chars().count();
        char_idx += len;
        if word.trim().is_empty() {
            continue;
        }
        let end = start + len;
        let lower = word.to_lowercase();
        let punct = is_punct(word);
        let capitalized_mid_sentence = seen_word
            && !punct
            && word.chars().next().is_some_and(|c| c.is_uppercase())
            && word.chars().skip(1).any(|c| c.is_lowercase());
        let pos = tag_pos(&lower, punct, capitalized_mid_sentence);
        let lemma = if punct { word.to_string() } else { naive_lemma(&lower) };
        tokens.push(Token {
            text: word.to_string(),
            lemma,
            pos,
            i: token_idx,
            start,
            end,
            tag: None,
            dep: None,
        });
        if !punct {
            seen_word = true;
        }
        token_idx += 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_boundaries() {
        let spans = split_sentences("I am fine. Are you okay? Yes!");
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn tokenizes_and_tags_pronouns() {
        let toks = tokenize("you never listen to me");
        let you = &toks[0];
        assert_eq!(you.text, "you");
        assert_eq!(you.pos, Pos::Pron);
    }

    #[test]
    fn naive_lemma_strips_common_suffixes() {
        assert_eq!(naive_lemma("running"), "runn");
        assert_eq!(naive_lemma("listened"), "listen");
        assert_eq!(naive_lemma("feelings"), "feeling");
    }
}
