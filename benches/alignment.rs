use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use readalong::config::PhraseMode;
use readalong::{
    AlignmentEngine, HypothesisBatch, HypothesisIngestor, Position, ResultSlot, ScriptModel,
    build_phrase_entries, build_window,
};
use std::hint::black_box;
use std::sync::Arc;

const SENTENCES: &[&str] = &[
    "Fred likes to dig in the sandbox.",
    "Max likes to dig in the sandbox, too.",
    "Max helps Fred dig a pond.",
    "\"Oh, no!\" said Fred. \"Their pond is too deep!\"",
];

/// Story of `pages` pages, each holding every sample sentence.
fn story(pages: usize) -> Arc<ScriptModel> {
    let page: Vec<&str> = SENTENCES.to_vec();
    let pages: Vec<&[&str]> = (0..pages).map(|_| page.as_slice()).collect();
    Arc::new(ScriptModel::from_text_pages(&pages).expect("sample story is valid"))
}

/// Recognizer-style stream for the whole story: every word, with filler
/// words and a homophone swap mixed in.
fn spoken_tokens(script: &ScriptModel) -> Vec<String> {
    let mut tokens = Vec::new();
    for (i, word) in script.words().enumerate() {
        if i % 7 == 0 {
            tokens.push("um".to_string());
        }
        let form = word.normalized();
        tokens.push(if form == "their" { "there".to_string() } else { form.to_string() });
    }
    tokens
}

fn bench_submit_token(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_token");
    for pages in [1, 10, 50] {
        let script = story(pages);
        let tokens = spoken_tokens(&script);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &tokens, |b, tokens| {
            b.iter(|| {
                let mut engine = AlignmentEngine::with_defaults(Arc::clone(&script));
                for token in tokens {
                    black_box(engine.submit_token(token));
                    engine.turn_page();
                }
                engine.position()
            })
        });
    }
    group.finish();
}

fn bench_ingest_batches(c: &mut Criterion) {
    let script = story(10);
    let tokens = spoken_tokens(&script);
    let batches: Vec<HypothesisBatch> = tokens
        .chunks(4)
        .enumerate()
        .map(|(i, chunk)| HypothesisBatch {
            sequence: Some(i as u64 + 1),
            results: vec![ResultSlot::from_text(chunk.join(" "))],
        })
        .collect();

    c.bench_function("ingest_batches", |b| {
        b.iter(|| {
            let mut engine = AlignmentEngine::with_defaults(Arc::clone(&script));
            let mut ingestor = HypothesisIngestor::new();
            for batch in &batches {
                black_box(ingestor.ingest_batch(&mut engine, batch.sequence, &batch.results));
                engine.turn_page();
            }
        })
    });
}

fn bench_focus_phrase(c: &mut Criterion) {
    let script = story(10);
    let position = Position::new(3, 1, 7);
    let mut group = c.benchmark_group("focus_phrase");
    for width in [5, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let window = build_window(&script, black_box(position), width);
                build_phrase_entries(&window, PhraseMode::Weighted)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_submit_token,
    bench_ingest_batches,
    bench_focus_phrase
);
criterion_main!(benches);
