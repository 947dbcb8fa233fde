//! Benchmarks for pdfredact.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Document, Object, Stream};

use pdfredact::{extract, RedactOptions, Redactor, RuleSet, StampConfig};

/// Creates a synthetic letter-size PDF with a few sensitive lines per page.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::with_capacity(page_count);
    for i in 0..page_count {
        let text = format!(
            "BT /F1 12 Tf 72 720 Td (Page {}) Tj ET\n\
             BT /F1 12 Tf 72 700 Td (Dr. Alice Morgan) Tj ET\n\
             BT /F1 12 Tf 72 680 Td (Seen on 01/15/2023 at county hospital) Tj ET\n\
             BT /F1 12 Tf 72 660 Td (blood pressure within normal range) Tj ET",
            i + 1
        );
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save synthetic pdf");
    bytes
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfredact::detect_format_from_bytes(black_box(&pdf_data)).is_ok());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfredact::detect_format_from_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark layout extraction at various sizes.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for page_count in [1, 10, 50].iter() {
        let data = create_test_pdf(*page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extract(black_box(&data)).is_ok());
        });
    }

    group.finish();
}

/// Benchmark the whole pipeline, parallel and sequential matching.
fn bench_redaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("redaction");
    let rules = RuleSet::baseline().expect("baseline rules");
    let data = create_test_pdf(50);

    let parallel = Redactor::new(rules.clone(), StampConfig::default()).expect("redactor");
    group.bench_function("50_pages_parallel", |b| {
        b.iter(|| parallel.redact(black_box(&data)).is_ok());
    });

    let sequential =
        Redactor::with_options(rules, StampConfig::default(), RedactOptions::new().sequential())
            .expect("redactor");
    group.bench_function("50_pages_sequential", |b| {
        b.iter(|| sequential.redact(black_box(&data)).is_ok());
    });

    group.finish();
}

/// Benchmark rule compilation.
fn bench_rule_compilation(c: &mut Criterion) {
    c.bench_function("baseline_rules", |b| {
        b.iter(|| RuleSet::baseline().is_ok());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_extraction,
    bench_redaction,
    bench_rule_compilation,
);
criterion_main!(benches);
