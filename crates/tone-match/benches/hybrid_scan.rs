//! Benchmarks the hybrid Aho-Corasick + regex scan against the brute-force
//! fallback scan over a representative trigger-word set (spec §4.2: the
//! hybrid path exists precisely because the fallback is O(n*m)).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tone_config::{ToneTriggerWords, TriggerRecord};
use tone_match::{ScanMode, TokenScanner};

fn trigger(text: &str, intensity: f64, kind: &str) -> TriggerRecord {
    TriggerRecord {
        text: text.to_string(),
        intensity,
        kind: kind.to_string(),
        variants: vec![],
        aho: vec![],
        context_tags: vec![],
    }
}

fn trigger_words() -> ToneTriggerWords {
    let alert_terms = [
        "shut up", "hate you", "ruin you", "or else", "stupid idiot", "never listen",
        "get out", "i'm done", "you always", "you never", "threaten", "destroy you",
    ];
    let caution_terms = [
        "not sure", "maybe later", "a bit worried", "kind of upset", "not great", "concerned about",
    ];
    let clear_terms = [
        "thank you", "appreciate you", "sounds good", "great job", "love you", "no worries",
    ];

    ToneTriggerWords {
        alert: alert_terms.iter().map(|t| trigger(t, 0.8, "phrase")).collect(),
        caution: caution_terms.iter().map(|t| trigger(t, 0.5, "phrase")).collect(),
        clear: clear_terms.iter().map(|t| trigger(t, 0.3, "phrase")).collect(),
        context_multipliers: Default::default(),
        attachment_bias: Default::default(),
    }
}

fn long_text() -> String {
    let sentence = "you never listen to me and honestly i'm done, maybe we could talk later, thank you for trying though. ";
    sentence.repeat(40)
}

fn bench_scan_modes(c: &mut Criterion) {
    let words = trigger_words();
    let text = long_text();

    let mut group = c.benchmark_group("hybrid_scan");
    for mode in [ScanMode::Hybrid, ScanMode::Aho, ScanMode::Fallback] {
        let scanner = TokenScanner::new(&words, mode).expect("scanner compiles");
        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &mode, |b, _| {
            b.iter(|| scanner.scan(black_box(&text), black_box("general"), black_box(&words)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_modes);
criterion_main!(benches);
