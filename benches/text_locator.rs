//! Text locator benchmark suite.
//!
//! Measures a single search pass over generated trees:
//! - Tree sizes: 100, 1000, 5000 elements
//! - Queries: substring, regex, multi-tag spelling
//!
//! Run with: cargo bench --bench text_locator
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use dom_wait::host::{Document, MemoryDocument};
use dom_wait::{Dom, NodeId, TextQuery};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const TREE_SIZES: &[usize] = &[100, 1000, 5000];

/// Children per generated section.
const FAN_OUT: usize = 10;

// ============================================================================
// Fixtures
// ============================================================================

/// Builds sections of `FAN_OUT` paragraphs, spelling "needle" one letter per
/// span in the last section.
fn build_tree(elements: usize) -> (Dom, NodeId) {
    let doc = Arc::new(MemoryDocument::new());
    let body = doc.body().expect("fresh documents have a body");

    let mut created = 0;
    while created < elements {
        let section = doc.create_element("section");
        doc.append_child(body, section).expect("append section");
        created += 1;

        for i in 0..FAN_OUT.min(elements - created) {
            let p = doc.create_element("p");
            doc.set_text_content(p, &format!("paragraph {created} line {i}"))
                .expect("set text");
            doc.append_child(section, p).expect("append paragraph");
            created += 1;
        }
    }

    let spelled = doc.create_element("div");
    doc.append_child(body, spelled).expect("append container");
    for c in "needle".chars() {
        let span = doc.create_element("span");
        doc.set_text_content(span, &c.to_string()).expect("set text");
        doc.append_child(spelled, span).expect("append span");
    }

    (Dom::new(doc), body)
}

// ============================================================================
// Benchmark: Single Pass
// ============================================================================

fn bench_find_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_text");

    for &size in TREE_SIZES {
        let (dom, body) = build_tree(size);

        let substring = TextQuery::text("paragraph 1 line 3").within(body);
        group.bench_with_input(BenchmarkId::new("substring", size), &substring, |b, q| {
            b.iter(|| black_box(dom.find_text(q).expect("valid query")));
        });

        let regex = TextQuery::regex(r"line \d{2}")
            .expect("valid pattern")
            .within(body);
        group.bench_with_input(BenchmarkId::new("regex_miss", size), &regex, |b, q| {
            b.iter(|| black_box(dom.find_text(q).expect("valid query")));
        });

        let spelled = TextQuery::text("needle").multiple_tags().within(body);
        group.bench_with_input(BenchmarkId::new("multiple_tags", size), &spelled, |b, q| {
            b.iter(|| black_box(dom.find_text(q).expect("valid query")));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Wait Resolution
// ============================================================================

fn bench_wait_for_text(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("wait_for_text");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let (dom, _) = build_tree(1000);
    group.bench_function("present_text", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                dom.wait_for_text(TextQuery::text("needle").multiple_tags())
                    .await
                    .expect("text present"),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_find_text, bench_wait_for_text);
criterion_main!(benches);
