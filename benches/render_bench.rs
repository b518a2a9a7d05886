use criterion::{Criterion, criterion_group, criterion_main};
use eframe::egui::Color32;
use kaleido_painter::{
    Engine, EngineConfig,
    canvas::{
        compositor::{CompositeOptions, compose},
        preview::PreviewRenderer,
    },
};

fn engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default()).expect("default config is valid");
    for _ in 0..3 {
        engine.add_default_layer().expect("layer added");
    }
    engine
}

fn bench_compose(c: &mut Criterion) {
    let engine = engine();
    let options = CompositeOptions {
        background: Color32::WHITE,
        isolate: false,
    };
    c.bench_function("compose_4_layers_800px", |b| {
        b.iter(|| compose(engine.layers(), options));
    });
}

fn bench_preview(c: &mut Criterion) {
    let mut engine = engine();
    let composite = engine.composite().clone();
    let wedge = engine.wedge();
    let renderer = PreviewRenderer::new(600, 600, Color32::WHITE);
    c.bench_function("mirrored_preview_600px", |b| {
        b.iter(|| renderer.render(&composite, &wedge));
    });
}

criterion_group!(benches, bench_compose, bench_preview);
criterion_main!(benches);
