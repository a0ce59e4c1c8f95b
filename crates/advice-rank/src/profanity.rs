//! Categorized, targeting-aware profanity scan (spec §4.12 step 1: "advanced
//! guardrail battery: categorized profanity (targeting-aware)"; spec §8
//! testable property: "inserting a 2nd-person pronoun adjacent to a
//! `targeting:'other'` profanity term flips `hasTargetedSecondPerson` to
//! true").

use tone_config::{ProfanityLexiconsConfig, Targeting};
use tone_core::CompactDoc;

/// How close (in chars) a profanity hit must be to a second-person pronoun
/// to count as "targeted at the other person" — roughly a two-word window.
const ADJACENCY_WINDOW_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfanityHit {
    pub term: String,
    pub severity: tone_config::ProfanitySeverity,
    pub targeting: Targeting,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfanityScan {
    pub hits: Vec<ProfanityHit>,
    pub has_targeted_second_person: bool,
}

impl ProfanityScan {
    pub fn has_any(&self) -> bool {
        !self.hits.is_empty()
    }

    pub fn max_alert_boost(&self) -> f64 {
        self.hits.iter().map(|h| h.severity.alert_boost()).fold(0.0, f64::max)
    }
}

fn is_adjacent(hit_start: usize, hit_end: usize, ent_start: usize, ent_end: usize) -> bool {
    let gap = if hit_end <= ent_start {
        ent_start - hit_end
    } else if ent_end <= hit_start {
        hit_start - ent_end
    } else {
        0
    };
    gap <= ADJACENCY_WINDOW_CHARS
}

/// Scan `text` against the lexicon, flagging any `targeting: other` hit that
/// sits within `ADJACENCY_WINDOW_CHARS` of a second-person pronoun entity.
pub fn scan(text: &str, doc: &CompactDoc, lexicon: &ProfanityLexiconsConfig) -> ProfanityScan {
    let lower = text.to_lowercase();
    let mut hits = Vec::new();

    for category in lexicon {
        for word in &category.trigger_words {
            let needle = word.to_lowercase();
            if needle.is_empty() {
                continue;
            }
            let mut search_from = 0;
            while let Some(pos) = lower[search_from..].find(&needle) {
                let start = search_from + pos;
                let end = start + needle.len();
                hits.push(ProfanityHit {
                    term: word.clone(),
                    severity: category.severity,
                    targeting: category.targeting,
                    start,
                    end,
                });
                search_from = end;
            }
        }
    }

    let second_person: Vec<(usize, usize)> = doc.second_person_entities().map(|e| (e.start, e.end)).collect();
    let has_targeted_second_person = hits.iter().any(|h| {
        matches!(h.targeting, Targeting::Other)
            && second_person.iter().any(|(s, e)| is_adjacent(h.start, h.end, *s, *e))
    });

    ProfanityScan { hits, has_targeted_second_person }
}
