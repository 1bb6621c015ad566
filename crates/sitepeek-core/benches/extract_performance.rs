//! Benchmarks for extraction and style scanning

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sitepeek_core::{PathTree, SourceDocument, analyze_styles, extract};
use url::Url;

// Build a page with a realistic mix of references
fn create_page(assets: usize) -> String {
    let mut html = String::from("<!doctype html><html><head><style>");
    for i in 0..assets / 4 {
        html.push_str(&format!(
            ".c{i} {{ color: #{:06x}; background: url(/img/bg{i}.png); font-family: 'Font {}', sans-serif; }}\n",
            i * 2731 % 0xff_ffff,
            i % 7
        ));
    }
    html.push_str("</style>");
    for i in 0..assets / 4 {
        html.push_str(&format!(r#"<link rel="stylesheet" href="/css/{i}.css">"#));
    }
    html.push_str("</head><body>");
    for i in 0..assets / 4 {
        html.push_str(&format!(
            r#"<div style="color: rgb({}, 10, 20)"><img src="../img/{i}.jpg" srcset="/img/{i}@2x.jpg 2x"></div>"#,
            i % 256
        ));
        html.push_str(&format!(r#"<script src="/js/chunk-{i}.js"></script>"#));
    }
    html.push_str("</body></html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let base = Url::parse("https://bench.test/app/index.html").expect("valid base");

    for assets in [40, 400, 4000] {
        let document = SourceDocument::new(base.clone(), create_page(assets));
        group.throughput(Throughput::Bytes(document.raw_html().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(assets), &document, |b, doc| {
            b.iter(|| extract(black_box(doc)));
        });
    }
    group.finish();
}

fn bench_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_styles");
    let base = Url::parse("https://bench.test/").expect("valid base");

    for assets in [40, 400, 4000] {
        let document = SourceDocument::new(base.clone(), create_page(assets));
        group.bench_with_input(BenchmarkId::from_parameter(assets), &document, |b, doc| {
            b.iter(|| analyze_styles(black_box(doc), &[]));
        });
    }
    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let base = Url::parse("https://bench.test/").expect("valid base");
    let document = SourceDocument::new(base, create_page(4000));
    let assets = extract(&document);

    c.bench_function("path_tree_4000", |b| {
        b.iter(|| PathTree::from_references(black_box(&assets).iter()));
    });
}

criterion_group!(benches, bench_extract, bench_styles, bench_tree);
criterion_main!(benches);
