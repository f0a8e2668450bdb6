use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::io::{Cursor, Read};
use zorgkompas::{ContentStore, SearchEngine, expand, filter_contacts, filter_definitions, normalize};
use zstd::stream::Decoder as ZstdDecoder;

static DATA_BYTES: &[u8] = include_bytes!(env!("ZORGKOMPAS_EMBEDDED_DATA"));

const QUERIES: &[&str] = &[
    "",
    "apa",
    "thuiszorg",
    "verzorgingshuis",
    "maison de retraite",
    "15",
];

fn bench_cold_load(c: &mut Criterion) {
    c.bench_function("cold_load::decompress_blob", |b| {
        b.iter(|| {
            let mut decoder = ZstdDecoder::new(Cursor::new(DATA_BYTES)).expect("cold-load decoder");
            let mut text = String::new();
            decoder.read_to_string(&mut text).expect("stream read");
            black_box(ContentStore::parse_json(&text).expect("embedded dataset parses"));
        });
    });
}

fn bench_expand(c: &mut Criterion) {
    for &query in QUERIES {
        c.bench_with_input(BenchmarkId::new("expand", query), &query, |b, &query| {
            b.iter(|| black_box(expand(query)));
        });
    }
}

fn bench_normalize(c: &mut Criterion) {
    let samples = [
        "Een toelage voor thuishulp [cite: 12, 34] of opname.",
        "  [cite_start]Verpleegkundige   zorg\taan huis [cite: 3]  ",
        "geen markers in deze tekst",
    ];
    c.bench_function("normalize::samples", |b| {
        b.iter(|| {
            for sample in samples {
                black_box(normalize(Some(sample)));
            }
        });
    });
}

fn bench_filters(c: &mut Criterion) {
    let store = ContentStore::embedded();
    for &query in QUERIES {
        let terms = expand(query);
        c.bench_with_input(BenchmarkId::new("filter_definitions", query), &terms, |b, terms| {
            b.iter(|| black_box(filter_definitions(store.definitions(), terms).len()));
        });
        c.bench_with_input(BenchmarkId::new("filter_contacts", query), &terms, |b, terms| {
            b.iter(|| black_box(filter_contacts(store.contacts(), terms).len()));
        });
    }
}

fn bench_search(c: &mut Criterion) {
    let engine = SearchEngine::embedded();
    for &query in QUERIES {
        c.bench_with_input(BenchmarkId::new("search", query), &query, |b, &query| {
            b.iter(|| black_box(engine.search(query).total()));
        });
    }
}

criterion_group!(
    benches,
    bench_cold_load,
    bench_expand,
    bench_normalize,
    bench_filters,
    bench_search
);
criterion_main!(benches);
