//! Benchmarks for the document and layout core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use termword::{Document, Layout};

fn long_document(paragraphs: usize) -> Document {
    let text = (0..paragraphs)
        .map(|i| {
            format!(
                "Paragraph {} contains enough text to span multiple lines and exercise the line breaker.",
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Document::from_text(&text)
}

fn bench_insert_single_char(c: &mut Criterion) {
    c.bench_function("insert_single_char", |b| {
        let mut doc = Document::from_text(&"x".repeat(10_000));
        b.iter(|| {
            let range = doc.start_point().forward_n(50).insert_text(black_box("y"));
            doc = range.document().clone();
        });
    });
}

fn bench_paragraph_split(c: &mut Criterion) {
    c.bench_function("paragraph_split", |b| {
        let doc = Document::from_text(&"word ".repeat(2_000));
        let point = doc.start_point().forward_n(100);
        b.iter(|| {
            black_box(point.insert_paragraph_break());
        });
    });
}

fn bench_relayout_one_edited_paragraph(c: &mut Criterion) {
    c.bench_function("relayout_one_edited_paragraph", |b| {
        let doc = long_document(50);
        let mut layout = Layout::new(doc.clone(), 80).unwrap();
        // warm the cache
        for _ in layout.line_iterator(0) {}

        b.iter(|| {
            let range = doc.start_point().insert_text(black_box("x"));
            layout.set_document(range.document().clone());
            for _ in layout.line_iterator(0) {}
            layout.set_document(doc.clone());
        });
    });
}

fn bench_full_line_iteration(c: &mut Criterion) {
    c.bench_function("full_line_iteration", |b| {
        let doc = long_document(200);
        let mut layout = Layout::new(doc.clone(), 80).unwrap();
        for _ in layout.line_iterator(0) {}

        b.iter(|| {
            let mut rows = 0;
            for _ in layout.line_iterator(0) {
                rows += 1;
            }
            black_box(rows);
        });
    });
}

criterion_group!(
    benches,
    bench_insert_single_char,
    bench_paragraph_split,
    bench_relayout_one_edited_paragraph,
    bench_full_line_iteration,
);
criterion_main!(benches);
