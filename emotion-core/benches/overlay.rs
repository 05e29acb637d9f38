use criterion::{Criterion, criterion_group, criterion_main};
use emotion_core::{BoundingBox, DetectedFace, DisplayList, OverlayRenderer, RasterSurface};
use image::{DynamicImage, RgbImage};
use std::hint::black_box;

fn build_faces(count: usize) -> Vec<DetectedFace> {
    (0..count)
        .map(|i| {
            let offset = 40.0 + i as f32 * 70.0;
            DetectedFace {
                bbox: BoundingBox::new(offset, 120.0, 64.0, 64.0),
                emotion_scores: [("happy", 72.5), ("neutral", 18.0), ("sad", 9.5)]
                    .into_iter()
                    .map(|(label, score)| (label.to_string(), score))
                    .collect(),
                dominant_emotion: "happy".into(),
                confidence: 72.5,
            }
        })
        .collect()
}

fn overlay_benchmark(c: &mut Criterion) {
    let renderer = OverlayRenderer::default();
    let faces = build_faces(8);
    let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, image::Rgb([40, 40, 40])));

    c.bench_function("overlay_display_list_8_faces", |b| {
        let mut list = DisplayList::new();
        b.iter(|| {
            renderer.render(
                &mut list,
                black_box(&faces),
                (640, 480),
                black_box((960.0, 720.0)),
            );
            black_box(list.commands().len());
        });
    });

    c.bench_function("overlay_raster_8_faces", |b| {
        let mut surface = RasterSurface::over(&frame);
        b.iter(|| {
            renderer.render(&mut surface, black_box(&faces), (640, 480), (640.0, 480.0));
            black_box(surface.dimensions());
        });
    });
}

criterion_group!(benches, overlay_benchmark);
criterion_main!(benches);
