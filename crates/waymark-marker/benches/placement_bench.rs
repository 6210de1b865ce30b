//! Benchmarks for marker placement.
//!
//! Run with: cargo bench -p waymark-marker

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waymark_core::document::{Document, ElementRole, NodeId};
use waymark_core::event::{Outbox, SpotId, TourId};
use waymark_core::geometry::{Rect, Sides, Size};
use waymark_core::memory::MemoryDocument;
use waymark_marker::layout;
use waymark_marker::{Marker, MarkerContent, MarkerSettings, Placement, Position, Stage};

fn page(anchors: usize) -> (MemoryDocument, NodeId, Vec<NodeId>) {
    let mut doc = MemoryDocument::new(Size::new(1280.0, 800.0));
    doc.set_intrinsic_size(ElementRole::Marker, Size::new(24.0, 16.0));
    let root = doc.root();
    let overlay = doc.insert(root, "div");
    let anchors = (0..anchors)
        .map(|i| {
            let a = doc.insert(root, "button");
            doc.set_rect(a, Rect::new(40.0 + (i % 10) as f64 * 120.0, 60.0 * (i / 10) as f64, 90.0, 32.0));
            a
        })
        .collect();
    (doc, overlay, anchors)
}

fn bench_layout_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker/layout");
    let anchor = Rect::new(1200.0, 100.0, 60.0, 30.0);
    let viewport = Rect::new(0.0, 0.0, 1280.0, 800.0);
    let size = Size::new(48.0, 20.0);

    for position in Position::ALL {
        group.bench_with_input(
            BenchmarkId::new("centering", position),
            &position,
            |b, &position| {
                b.iter(|| {
                    black_box(layout::centering_margin(
                        position,
                        size,
                        anchor,
                        viewport,
                        Sides::ZERO,
                    ))
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("overlay_offset", position),
            &position,
            |b, &position| b.iter(|| black_box(layout::overlay_offset(position, anchor, size, 15.0))),
        );
    }

    group.finish();
}

fn bench_show_hide(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker/show_hide");

    for placement in Placement::ALL {
        group.bench_function(BenchmarkId::new("cycle", placement), |b| {
            b.iter_batched(
                || {
                    let (mut doc, overlay, anchors) = page(1);
                    let settings = MarkerSettings {
                        placement,
                        ..MarkerSettings::default()
                    };
                    let mut marker = Marker::new(TourId(0), SpotId(0), settings);
                    let _ = marker.build(&mut doc, anchors[0], &MarkerContent::default());
                    (doc, overlay, marker)
                },
                |(mut doc, overlay, mut marker)| {
                    let stage = Stage {
                        tour_active: true,
                        is_current: true,
                        always_mark: true,
                        overlay_root: overlay,
                    };
                    let mut out = Outbox::new();
                    marker.show(&mut doc, &stage, &mut out);
                    marker.hide(&mut doc, &mut out);
                    black_box(out.drain().len())
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_reposition_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker/reposition");

    for n in [10, 100, 500] {
        let (mut doc, overlay, anchors) = page(n);
        let stage = Stage {
            tour_active: true,
            is_current: true,
            always_mark: true,
            overlay_root: overlay,
        };
        let settings = MarkerSettings {
            placement: Placement::Overlay,
            ..MarkerSettings::default()
        };
        let mut markers: Vec<Marker> = anchors
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let mut m = Marker::new(TourId(0), SpotId(i as u64), settings);
                let _ = m.build(&mut doc, a, &MarkerContent::default());
                m.show(&mut doc, &stage, &mut Outbox::new());
                m
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("overlay", n), &n, |b, _| {
            b.iter(|| {
                for m in &mut markers {
                    m.place(&mut doc);
                }
                black_box(doc.viewport())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout_math, bench_show_hide, bench_reposition_many);
criterion_main!(benches);
