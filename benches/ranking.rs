use criterion::{criterion_group, criterion_main, Criterion};
use imgmatch::{FeatureRecord, FeatureStore, MatchConfig, Matcher, Method, OwnedImage, RegionLayout};
use std::hint::black_box;

fn make_image(width: usize, height: usize, seed: usize) -> OwnedImage<[u8; 3]> {
    OwnedImage::from_fn(width, height, |x, y| {
        let value = ((x * 13) ^ (y * 7) ^ (x * y) ^ seed) & 0xFF;
        [value as u8, (value * 3 & 0xFF) as u8, (255 - value) as u8]
    })
    .unwrap()
}

fn bench_extraction(c: &mut Criterion) {
    let image = make_image(512, 384, 0);
    let regions = RegionLayout::Halves;

    for method in [
        Method::Baseline,
        Method::Histogram,
        Method::Chromaticity,
        Method::Texture,
        Method::Multi,
    ] {
        let strategy = method.strategy(None, &regions);
        c.bench_function(&format!("extract_{}", method.name()), |b| {
            b.iter(|| black_box(strategy.describe(&image).unwrap()));
        });
    }
}

fn bench_ranking(c: &mut Criterion) {
    let regions = RegionLayout::Halves;
    let method = Method::Multi;
    let strategy = method.strategy(None, &regions);

    let records = (0..1000)
        .map(|i| {
            let image = make_image(64, 48, i);
            let features = strategy.describe(&image).unwrap();
            FeatureRecord::new(format!("pic.{i:04}.jpg"), features.into_values())
        })
        .collect();
    let store = FeatureStore::from_records(records).unwrap();
    let target = strategy.describe(&make_image(64, 48, 17)).unwrap();

    let base_cfg = MatchConfig {
        k: 10,
        least: 10,
        parallel: false,
    };
    let matcher = Matcher::new(method.default_metric(&regions).unwrap())
        .with_config(base_cfg.clone());
    c.bench_function("rank_multi_1000", |b| {
        b.iter(|| black_box(matcher.rank(&target, &store).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let matcher_par = Matcher::new(method.default_metric(&regions).unwrap()).with_config(
            MatchConfig {
                parallel: true,
                ..base_cfg
            },
        );
        c.bench_function("rank_multi_1000_parallel", |b| {
            b.iter(|| black_box(matcher_par.rank(&target, &store).unwrap()));
        });
    }
}

criterion_group!(benches, bench_extraction, bench_ranking);
criterion_main!(benches);
