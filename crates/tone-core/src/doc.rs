//! `CompactDoc` — the normalized linguistic analysis object passed between
//! `tone-nlp`'s local analyzer and everything downstream (spec §3, §4.4).

use serde::{Deserialize, Serialize};

/// Current `CompactDoc` wire version (spec §4.4: `"1.2.0"`).
pub const COMPACT_DOC_VERSION: &str = "1.2.0";

/// A half-open char span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Merge two spans into their covering span. Used when adjacent spans
    /// (negation scopes, second-person entities) are coalesced.
    pub fn merge(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A half-open *token-index* span `[start, end)`, distinct from a char `Span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(&self, other: &TokenSpan) -> TokenSpan {
        TokenSpan::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_adjacent_or_overlapping(&self, other: &TokenSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Heuristic part-of-speech tag (spec §4.3: "POS heuristic").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pos {
    Pron,
    Aux,
    Verb,
    Adv,
    Adj,
    Propn,
    Punct,
    Noun,
}

impl Pos {
    /// Preference order used when picking a negation head: `VERB ≻ AUX ≻ ADJ`
    /// (spec §4.3). Higher is more preferred; anything else is `0`.
    pub fn negation_head_preference(&self) -> u8 {
        match self {
            Pos::Verb => 3,
            Pos::Aux => 2,
            Pos::Adj => 1,
            _ => 0,
        }
    }
}

/// A single analyzed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    /// Token index within the document.
    pub i: usize,
    pub start: usize,
    pub end: usize,
    pub tag: Option<String>,
    pub dep: Option<String>,
}

/// A dependency edge, currently only `rel == "neg"` is produced (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dep {
    pub head: usize,
    pub token: usize,
    pub rel: String,
    pub char_start: usize,
    pub char_end: usize,
}

/// Sarcasm detector output (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Sarcasm {
    pub present: bool,
    pub score: f64,
}

/// Context classifier output (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    pub label: String,
    pub score: f64,
    pub secondary: Option<String>,
    pub confidence: f64,
    pub ranked: Vec<(String, f64)>,
}

impl Default for ContextResult {
    fn default() -> Self {
        Self {
            label: "general".to_string(),
            score: 0.0,
            secondary: None,
            confidence: 0.0,
            ranked: Vec::new(),
        }
    }
}

/// A phrase-edge hit: a compiled-regex category match with a weight
/// (spec §3, §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEdge {
    pub category: String,
    pub weight: f64,
    pub start: usize,
    pub end: usize,
}

/// A named entity span. Currently `PERSON` and `PRON_2P` (second-person
/// pronoun) labels are produced (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// The stable, normalized linguistic-analysis object (spec §3, §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactDoc {
    pub version: String,
    pub tokens: Vec<Token>,
    pub sents: Vec<Span>,
    pub deps: Vec<Dep>,
    /// `headIdx -> subtree char span`, populated only for heads that own a
    /// negation dependency (spec §3).
    pub subtree_span: std::collections::HashMap<usize, Span>,
    pub sarcasm: Sarcasm,
    pub context: ContextResult,
    pub phrase_edges: Vec<PhraseEdge>,
    /// Negation scopes, in **token** indices (spec §3 invariant:
    /// `negScopes[i].start <= negScopes[i].end`, adjacent spans merged,
    /// width capped).
    pub neg_scopes: Vec<TokenSpan>,
    pub entities: Vec<Entity>,
}

impl CompactDoc {
    /// A fully-formed, empty document: used as the fallback whenever
    /// analysis fails (spec §4.4, §7: "return a fully-formed fallback
    /// CompactDoc rather than throw").
    pub fn fallback(text: &str) -> Self {
        Self {
            version: COMPACT_DOC_VERSION.to_string(),
            tokens: Vec::new(),
            sents: vec![Span::new(0, text.chars().count())],
            deps: Vec::new(),
            subtree_span: std::collections::HashMap::new(),
            sarcasm: Sarcasm::default(),
            context: ContextResult::default(),
            phrase_edges: Vec::new(),
            neg_scopes: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn has_negation(&self) -> bool {
        !self.neg_scopes.is_empty()
    }

    pub fn second_person_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.label == "PRON_2P")
    }

    pub fn second_person_count(&self) -> usize {
        self.second_person_entities().count()
    }
}
