//! Negation marker detection and dependency-heuristic scope inference
//! (spec §4.3: "LocalNLP infers negation scope without a real parser by
//! walking forward from each marker to the nearest head token").

use tone_core::{Dep, Token, TokenSpan};

/// How many tokens we'll scan for a head token — forward first, then
/// backward within the same span — before giving up and scoping just the
/// marker itself (spec §4.3: "look right up to 6 tokens... else left
/// within the same window... default to the negator itself").
const NEGATION_WINDOW: usize = 6;

/// Find every negation-marker token index.
pub fn find_markers(tokens: &[Token], indicators: &[String]) -> Vec<usize> {
    if indicators.is_empty() {
        return default_markers(tokens);
    }
    let set: std::collections::HashSet<&str> = indicators.iter().map(String::as_str).collect();
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| set.contains(t.lemma.as_str()) || set.contains(t.text.to_lowercase().as_str()))
        .map(|(i, _)| i)
        .collect()
}

fn default_markers(tokens: &[Token]) -> Vec<usize> {
    const DEFAULT: &[&str] = &["not", "never", "no", "n't", "cannot", "can't", "won't", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "weren't", "nothing", "nobody", "none", "without", "neither", "nor"];
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| DEFAULT.contains(&t.text.to_lowercase().as_str()))
        .map(|(i, _)| i)
        .collect()
}

/// Walk forward from each marker to the nearest "head-like" token (per
/// `Pos::negation_head_preference`); if nothing qualifies within the
/// forward window, fall back to scanning the same number of tokens
/// backward before giving up and scoping just the marker itself. Produces
/// a token-index scope from the marker through that head (inclusive) and
/// synthesizes a shallow `Dep` edge `marker -> head` tagged `"neg"` for
/// downstream consumers that want a dependency-shaped view without a real
/// parser.
pub fn infer_scopes(tokens: &[Token], markers: &[usize]) -> (Vec<TokenSpan>, Vec<Dep>) {
    let mut scopes = Vec::with_capacity(markers.len());
    let mut deps = Vec::with_capacity(markers.len());

    for &marker_idx in markers {
        let window_end = (marker_idx + NEGATION_WINDOW).min(tokens.len().saturating_sub(1));
        let mut best: Option<(usize, u8)> = None;
        for idx in (marker_idx + 1)..=window_end {
            let Some(tok) = tokens.get(idx) else { break };
            let pref = tok.pos.negation_head_preference();
            if pref > 0 && best.map(|(_, p)| pref > p).unwrap_or(true) {
                best = Some((idx, pref));
            }
        }
        if best.is_none() {
            let window_start = marker_idx.saturating_sub(NEGATION_WINDOW);
            for idx in (window_start..marker_idx).rev() {
                let Some(tok) = tokens.get(idx) else { continue };
                let pref = tok.pos.negation_head_preference();
                if pref > 0 && best.map(|(_, p)| pref > p).unwrap_or(true) {
                    best = Some((idx, pref));
                }
            }
        }
        let head_idx = best.map(|(i, _)| i).unwrap_or(marker_idx);
        scopes.push(TokenSpan {
            start: head_idx.min(marker_idx),
            end: head_idx.max(marker_idx),
        });
        if let (Some(marker_tok), Some(head_tok)) = (tokens.get(marker_idx), tokens.get(head_idx)) {
            deps.push(Dep {
                head: head_idx,
                token: marker_idx,
                rel: "neg".to_string(),
                char_start: marker_tok.start.min(head_tok.start),
                char_end: marker_tok.end.max(head_tok.end),
            });
        }
    }
    (scopes, deps)
}

/// `true` if token index `idx` falls inside any negation scope.
pub fn is_negated(idx: usize, scopes: &[TokenSpan]) -> bool {
    scopes.iter().any(|s| idx >= s.start && idx <= s.end)
}

pub fn matches_pattern(patterns: &[regex::Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}
