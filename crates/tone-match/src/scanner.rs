//! `TokenScanner` (C2): finds tone-trigger hits in text using one of three
//! strategies (spec §4.2):
//!
//! - `aho`: a single Aho-Corasick automaton per bucket over every literal
//!   surface form (`text`, `variants`, `aho`), fastest but can't express
//!   regex-kind triggers.
//! - `fallback`: brute-force word-boundary substring scan, used when the
//!   automaton can't be built (e.g. empty pattern set) or is explicitly
//!   requested for debugging.
//! - `hybrid` (default): Aho-Corasick for literal triggers plus compiled
//!   regexes for `kind == "regex"` triggers, unioned.

use crate::error::MatchError;
use crate::hit::{dedupe, TriggerHit};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use tone_config::{ToneTriggerWords, TriggerRecord};
use tone_core::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Aho,
    Fallback,
    Hybrid,
}

impl From<tone_config::ScanMode> for ScanMode {
    fn from(m: tone_config::ScanMode) -> Self {
        match m {
            tone_config::ScanMode::Aho => ScanMode::Aho,
            tone_config::ScanMode::Fallback => ScanMode::Fallback,
            tone_config::ScanMode::Hybrid => ScanMode::Hybrid,
        }
    }
}

struct BucketIndex {
    bucket: Bucket,
    /// Index into the automaton's pattern list -> (record index, surface).
    literal_surfaces: Vec<(usize, String)>,
    automaton: Option<AhoCorasick>,
    regexes: Vec<(usize, regex::Regex)>,
}

pub struct TokenScanner {
    mode: ScanMode,
    indices: Vec<BucketIndex>,
}

fn surfaces_for(record: &TriggerRecord) -> Vec<String> {
    let mut out = vec![record.text.to_lowercase()];
    out.extend(record.variants.iter().map(|v| v.to_lowercase()));
    out.extend(record.aho.iter().map(|v| v.to_lowercase()));
    out
}

fn is_word_boundary(bytes: &[u8], idx: usize) -> bool {
    if idx == 0 || idx >= bytes.len() {
        return true;
    }
    !(bytes[idx - 1] as char).is_alphanumeric() || !(bytes[idx] as char).is_alphanumeric()
}

impl TokenScanner {
    pub fn new(trigger_words: &ToneTriggerWords, mode: ScanMode) -> Result<Self, MatchError> {
        let mut indices = Vec::new();
        for bucket in Bucket::ALL {
            let records = trigger_words.by_bucket(bucket);
            let mut literal_surfaces = Vec::new();
            let mut regexes = Vec::new();

            for (idx, record) in records.iter().enumerate() {
                if record.kind == "regex" {
                    match regex::RegexBuilder::new(&record.text).case_insensitive(true).build() {
                        Ok(re) => regexes.push((idx, re)),
                        Err(e) => {
                            tracing::warn!(pattern = %record.text, bucket = %bucket, error = %e, "match.pattern.invalid");
                        }
                    }
                } else {
                    for surface in surfaces_for(record) {
                        literal_surfaces.push((idx, surface));
                    }
                }
            }

            let automaton = if matches!(mode, ScanMode::Aho | ScanMode::Hybrid) && !literal_surfaces.is_empty() {
                let patterns: Vec<&str> = literal_surfaces.iter().map(|(_, s)| s.as_str()).collect();
                match AhoCorasickBuilder::new()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&patterns)
                {
                    Ok(ac) => Some(ac),
                    Err(e) => {
                        tracing::warn!(bucket = %bucket, error = %e, "match.automaton.build_failed");
                        None
                    }
                }
            } else {
                None
            };

            indices.push(BucketIndex {
                bucket,
                literal_surfaces,
                automaton,
                regexes,
            });
        }
        Ok(Self { mode, indices })
    }

    fn scan_literal_fallback(text_lower: &str, idx: &BucketIndex) -> Vec<(usize, usize, usize)> {
        let bytes = text_lower.as_bytes();
        let mut out = Vec::new();
        for (record_idx, surface) in &idx.literal_surfaces {
            if surface.is_empty() {
                continue;
            }
            let mut search_from = 0;
            while let Some(pos) = text_lower[search_from..].find(surface.as_str()) {
                let start = search_from + pos;
                let end = start + surface.len();
                if is_word_boundary(bytes, start) && is_word_boundary(bytes, end) {
                    out.push((*record_idx, start, end));
                }
                search_from = start + surface.len().max(1);
            }
        }
        out
    }

    /// Scan `text` for trigger hits, scaling each hit's weight by the
    /// configured context multiplier for `context` (spec §4.2 step 4).
    pub fn scan(&self, text: &str, context: &str, trigger_words: &ToneTriggerWords) -> Vec<TriggerHit> {
        let text_lower = text.to_lowercase();
        let mut hits = Vec::new();

        for idx in &self.indices {
            let records = trigger_words.by_bucket(idx.bucket);

            let literal_hits: Vec<(usize, usize, usize)> = match self.mode {
                ScanMode::Fallback => Self::scan_literal_fallback(&text_lower, idx),
                ScanMode::Aho | ScanMode::Hybrid => {
                    if let Some(ac) = &idx.automaton {
                        ac.find_iter(&text_lower)
                            .map(|m| {
                                let (record_idx, _) = idx.literal_surfaces[m.pattern().as_usize()];
                                (record_idx, m.start(), m.end())
                            })
                            .collect()
                    } else {
                        Self::scan_literal_fallback(&text_lower, idx)
                    }
                }
            };

            for (record_idx, start, end) in literal_hits {
                if let Some(record) = records.get(record_idx) {
                    let multiplier = trigger_words.context_multiplier(context, &record.kind);
                    hits.push(TriggerHit {
                        bucket: idx.bucket,
                        term: record.text.clone(),
                        kind: record.kind.clone(),
                        start,
                        end,
                        weight: record.intensity * multiplier,
                    });
                }
            }

            if matches!(self.mode, ScanMode::Hybrid | ScanMode::Aho) {
                for (record_idx, re) in &idx.regexes {
                    for m in re.find_iter(&text_lower) {
                        if let Some(record) = records.get(*record_idx) {
                            let multiplier = trigger_words.context_multiplier(context, &record.kind);
                            hits.push(TriggerHit {
                                bucket: idx.bucket,
                                term: record.text.clone(),
                                kind: record.kind.clone(),
                                start: m.start(),
                                end: m.end(),
                                weight: record.intensity * multiplier,
                            });
                        }
                    }
                }
            }
        }

        dedupe(hits)
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }
}
