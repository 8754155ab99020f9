use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use outliner_core::{
    entities::BBox,
    layout::{LayoutBlock, LayoutDocument, LayoutLine, LayoutPage, LayoutSpan, SPAN_FLAG_BOLD},
    OutlineConfig, OutlineExtractor,
};

fn layout_line(text: &str, y: f32, size: f32, bold: bool) -> LayoutLine {
    let width = text.chars().count() as f32 * size * 0.5;
    LayoutLine {
        bbox: BBox::new(72.0, y, 72.0 + width, y + size),
        spans: vec![LayoutSpan {
            text: text.to_owned(),
            size,
            font: if bold { "Helvetica-Bold" } else { "Helvetica" }.to_owned(),
            flags: if bold { SPAN_FLAG_BOLD } else { 0 },
            color: 0,
        }],
    }
}

/// A report of `pages` pages: running header, page number, two numbered sections and a
/// column of body text per page.
fn synthetic_report(pages: usize) -> LayoutDocument {
    let pages = (0..pages)
        .map(|p| {
            let mut lines = vec![
                layout_line("Annual Operations Review", 20.0, 9.0, false),
                layout_line(&format!("{} Chapter Heading", p + 1), 80.0, 22.0, true),
                layout_line(&format!("{}.1 Section Heading", p + 1), 420.0, 16.0, true),
                layout_line(&format!("Page {}", p + 1), 815.0, 9.0, false),
            ];
            lines.extend((0..40).map(|i| {
                layout_line(
                    "the committee reviewed the quarterly figures and approved the budget.",
                    120.0 + i as f32 * 16.0,
                    11.0,
                    false,
                )
            }));
            LayoutPage {
                width: 595.0,
                height: 842.0,
                blocks: lines
                    .into_iter()
                    .map(|line| LayoutBlock {
                        bbox: line.bbox,
                        lines: vec![line],
                    })
                    .collect(),
            }
        })
        .collect();
    LayoutDocument { pages }
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_pipeline");
    let mut extractor = OutlineExtractor::new(OutlineConfig::new().unwrap());

    for pages in [5, 50] {
        let doc = synthetic_report(pages);
        group.bench_function(format!("extract_{pages}_pages"), |b| {
            b.iter(|| black_box(extractor.extract(black_box(&doc))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
