use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{FeatureAssembler, FeatureConfig, SpectrumConfig, WindowKind};
use std::f64::consts::PI;

fn capture(rate: u32) -> Vec<f64> {
    (0..rate as usize)
        .map(|i| {
            let t = i as f64 / rate as f64;
            0.3 * (2.0 * PI * 236.4 * t).sin() + 0.05 * (2.0 * PI * 1_000.0 * t).sin()
        })
        .collect()
}

fn bench_featurize(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let signal = capture(config.sampling_rate);

    let rectangular = FeatureAssembler::new(config.clone()).unwrap();
    c.bench_function("featurize_1s_20480hz", |b| {
        b.iter(|| rectangular.featurize(black_box(&signal)).unwrap())
    });

    let hann = FeatureAssembler::new(FeatureConfig {
        spectrum: SpectrumConfig {
            window: WindowKind::Hann,
            ..Default::default()
        },
        ..config
    })
    .unwrap();
    c.bench_function("featurize_1s_20480hz_hann", |b| {
        b.iter(|| hann.featurize(black_box(&signal)).unwrap())
    });
}

criterion_group!(benches, bench_featurize);
criterion_main!(benches);
