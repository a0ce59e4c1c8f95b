//! Phrase-edge detection (spec §3 `phraseEdges`): config-driven regex
//! patterns tagging a categorized, weighted span (e.g. "absolute claim",
//! "blame attribution") independent of the tone-trigger lexicon.

use tone_config::PhraseEdgesConfig;
use tone_core::PhraseEdge;

pub fn compile(cfg: &PhraseEdgesConfig) -> Vec<(regex::Regex, String, f64)> {
    cfg.iter()
        .filter_map(|p| {
            regex::RegexBuilder::new(&p.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    tracing::warn!(pattern = %p.pattern, error = %e, "nlp.phrase_edge.pattern.invalid");
                    e
                })
                .ok()
                .map(|re| (re, p.category.clone(), p.weight))
        })
        .collect()
}

/// Byte offset -> char offset, since `regex` reports byte positions but
/// `CompactDoc` spans are char-indexed throughout (spec §3).
fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    text.char_indices()
        .take_while(|(b, _)| *b < byte_idx)
        .count()
}

pub fn detect(text: &str, compiled: &[(regex::Regex, String, f64)]) -> Vec<PhraseEdge> {
    let mut edges = Vec::new();
    for (re, category, weight) in compiled {
        for m in re.find_iter(text) {
            edges.push(PhraseEdge {
                category: category.clone(),
                weight: *weight,
                start: byte_to_char(text, m.start()),
                end: byte_to_char(text, m.end()),
            });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::PhraseEdgePattern;

    #[test]
    fn detects_and_positions_char_spans() {
        let cfg = vec![PhraseEdgePattern {
            pattern: "you always".to_string(),
            category: "absolute_claim".to_string(),
            weight: 0.6,
        }];
        let compiled = compile(&cfg);
        let edges = detect("honestly you always do this", &compiled);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].category, "absolute_claim");
        assert_eq!(edges[0].start, 9);
        assert_eq!(edges[0].end, 19);
    }
}
