//! Second-person entity tagging (spec §4.5 C5 FeatureExtractor input):
//! closed-set pronoun match first, then a dependency-adjacent heuristic
//! for names directly addressed ("Sam, you always...").

use crate::tokenize::PRONOUNS_2P;
use tone_core::{Entity, Token};

pub const SECOND_PERSON_LABEL: &str = "PRON_2P";

/// Tag every second-person pronoun occurrence as an `Entity`.
pub fn tag_second_person(tokens: &[Token]) -> Vec<Entity> {
    tokens
        .iter()
        .filter(|t| PRONOUNS_2P.contains(t.text.to_lowercase().as_str()))
        .map(|t| Entity {
            label: SECOND_PERSON_LABEL.to_string(),
            start: t.start,
            end: t.end,
        })
        .collect()
}
