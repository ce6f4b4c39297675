use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snipcheck_core::analysis::AnalysisEngine;
use snipcheck_core::parser::{self, Backend};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

fn generate_javascript(functions: usize) -> String {
    let mut code = String::with_capacity(functions * 400);
    code.push_str("// Generated JavaScript for benchmarking\n\n");

    for i in 0..functions {
        code.push_str(&format!(
            r#"function process{i}(items, limit) {{
    const results = [];
    for (let j = 0; j < items.length; j++) {{
        if (items[j].score > limit) {{
            results.push({{ id: items[j].id, score: items[j].score * 2 }});
        }}
    }}
    if (results.length === 0) {{
        return null;
    }}
    console.log("processed", results.length);
    return results;
}}

const handler{i} = (event) => {{
    validate(event);
    normalize(event);
    dispatch(event);
}};

"#
        ));
    }

    code
}

fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("{}/{}", FIXTURES_DIR, path))
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", path))
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let code = generate_javascript(25);
    group.throughput(Throughput::Elements(code.lines().count() as u64));

    for backend in Backend::ALL {
        group.bench_with_input(BenchmarkId::new("parse_500_loc", backend), &code, |b, code| {
            b.iter(|| parser::parse(black_box(code), backend))
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let engine = AnalysisEngine::new();

    let code = generate_javascript(25);
    for backend in Backend::ALL {
        group.bench_with_input(BenchmarkId::new("analyze_500_loc", backend), &code, |b, code| {
            b.iter(|| engine.analyze_with(black_box(code), backend))
        });
    }

    let fixture = read_fixture("snippets/mixed.js");
    group.bench_function("analyze_fixture", |b| {
        b.iter(|| engine.analyze(black_box(&fixture)))
    });

    for size in [10, 50, 200] {
        let code = generate_javascript(size);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("source_size", size), &code, |b, code| {
            b.iter(|| engine.analyze(black_box(code)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_analysis);
criterion_main!(benches);
