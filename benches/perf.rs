use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ddragon_terminal::config::ClientConfig;
use ddragon_terminal::ddragon_fetch::{parse_catalogue_json, parse_detail_json};
use ddragon_terminal::media::MediaLocator;
use ddragon_terminal::pipeline::Pipeline;
use ddragon_terminal::state::{Delta, LocaleList, LocaleSource};

const CATALOGUE_JSON: &str = include_str!("../tests/fixtures/champion_en_US.json");
const DETAIL_JSON: &str = include_str!("../tests/fixtures/detail_Ahri_en_US.json");

/// A catalogue roughly the size of a live release.
fn large_catalogue_json(count: usize) -> String {
    let entries = (0..count)
        .map(|i| {
            format!(
                r#""Champ{i}":{{"id":"Champ{i}","key":"{key}","name":"Champion {name}","tags":["Mage"],"image":{{"full":"Champ{i}.png"}}}}"#,
                key = i + 1,
                name = (count - i) * 7 % 997,
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"type":"champion","data":{{{entries}}}}}"#)
}

fn bench_catalogue_parse(c: &mut Criterion) {
    let large = large_catalogue_json(170);
    c.bench_function("catalogue_parse_fixture", |b| {
        b.iter(|| {
            let catalogue = parse_catalogue_json(black_box(CATALOGUE_JSON)).unwrap();
            black_box(catalogue.entries.len());
        })
    });
    c.bench_function("catalogue_parse_170", |b| {
        b.iter(|| {
            let catalogue = parse_catalogue_json(black_box(&large)).unwrap();
            black_box(catalogue.key_index.len());
        })
    });
}

fn bench_detail_parse(c: &mut Criterion) {
    c.bench_function("detail_parse", |b| {
        b.iter(|| {
            let detail = parse_detail_json(black_box(DETAIL_JSON), "Ahri").unwrap();
            black_box(detail.spells.len());
        })
    });
}

fn bench_filter_and_media(c: &mut Criterion) {
    let config = ClientConfig::default();
    let mut pipeline = Pipeline::new(&config);
    pipeline.start();
    pipeline.apply(Delta::VersionResolved(Ok("14.1.1".to_string())));
    pipeline.apply(Delta::LocalesResolved(LocaleList {
        locales: vec!["en_US".to_string()],
        source: LocaleSource::Remote,
    }));
    pipeline.apply(Delta::CatalogueLoaded {
        generation: 1,
        locale: "en_US".to_string(),
        result: parse_catalogue_json(&large_catalogue_json(170)),
    });
    pipeline.set_search("champion 1");

    c.bench_function("roster_filter", |b| {
        b.iter(|| black_box(pipeline.state().filtered_entries().len()))
    });

    let locator = MediaLocator::new(config.base_url.clone(), config.media_base_url.clone());
    let index = pipeline.state().key_index().clone();
    c.bench_function("media_reference", |b| {
        b.iter(|| black_box(locator.build_media_reference(&index, "Champ42", "q").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_catalogue_parse,
    bench_detail_parse,
    bench_filter_and_media
);
criterion_main!(benches);
