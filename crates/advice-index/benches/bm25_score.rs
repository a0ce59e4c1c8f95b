//! Benchmarks BM25 index construction and scoring over a synthetic
//! therapy-advice corpus (spec §4.10), the hot loop on every suggestions
//! request's candidate-preselection step.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use tone_core::{AdviceItem, Bucket};

fn corpus(n: usize) -> Vec<AdviceItem> {
    let phrases = [
        "take a gentle breath and name the feeling before responding",
        "try reflecting back what you heard before replying",
        "set a clear boundary without raising your voice",
        "ask an open question instead of assuming intent",
        "acknowledge the other person's effort before the ask",
        "name your own need plainly and specifically",
        "pause the conversation if it is escalating too fast",
        "use an i-statement instead of a you-statement",
    ];
    (0..n)
        .map(|i| AdviceItem {
            id: format!("a{i}"),
            advice: phrases[i % phrases.len()].to_string(),
            trigger_tone: [Bucket::Clear, Bucket::Caution, Bucket::Alert][i % 3],
            contexts: vec![],
            attachment_styles: vec![],
            severity_threshold: HashMap::new(),
            categories: vec!["de-escalation".into()],
            intents: vec![],
            context_link: vec![],
            patterns: vec![],
            tags: vec!["communication".into()],
            style_tuning: HashMap::new(),
            boost_sources: vec![],
            keywords: vec!["feeling".into(), "boundary".into()],
            negation_sensitive: false,
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let items = corpus(500);
    c.bench_function("bm25_build_500", |b| {
        b.iter(|| advice_index::Bm25Index::build(black_box(&items)));
    });
}

fn bench_score(c: &mut Criterion) {
    let items = corpus(500);
    let index = advice_index::Bm25Index::build(&items);
    let query = advice_index::tokenize("name the feeling and set a boundary");
    c.bench_function("bm25_score_500", |b| {
        b.iter(|| index.score(black_box(&query)));
    });
}

criterion_group!(benches, bench_build, bench_score);
criterion_main!(benches);
