use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use osteon_core::{Repeat, RuntimeConfig, SkeletonData, SkeletonRuntime, TextureAtlas};
use serde_json::{json, Value};

/// A chain of `count` bones, each rotating over one second.
fn chain_document(count: usize) -> String {
    let bones: Vec<Value> = (0..count)
        .map(|i| {
            if i == 0 {
                json!({"name": "b0"})
            } else {
                json!({"name": format!("b{i}"), "parent": format!("b{}", i - 1), "x": 4})
            }
        })
        .collect();
    let timelines: serde_json::Map<String, Value> = (0..count)
        .map(|i| {
            (
                format!("b{i}"),
                json!({"rotate": [
                    {"time": 0, "angle": 0},
                    {"time": 0.5, "angle": 20, "curve": [0.25, 0.1, 0.25, 1.0]},
                    {"time": 1, "angle": 0}
                ]}),
            )
        })
        .collect();
    json!({
        "bones": bones,
        "animations": {"sway": {"bones": timelines}}
    })
    .to_string()
}

fn tick_benchmark(c: &mut Criterion) {
    let data = Arc::new(
        SkeletonData::from_json(&chain_document(128), Arc::new(TextureAtlas::new()))
            .expect("bench skeleton"),
    );
    let mut rt = SkeletonRuntime::from_data(data, None, RuntimeConfig::default())
        .expect("bench runtime");
    rt.run_animation("sway", Repeat::Forever).expect("sway exists");

    c.bench_function("activate_animations_128_bones", |b| {
        b.iter(|| {
            rt.activate_animations(black_box(1.0 / 60.0));
            black_box(rt.bones().len());
        })
    });

    let doc = osteon_test_fixtures::skeletons::json("stick-figure").expect("skeleton fixture");
    let atlas: TextureAtlas =
        osteon_test_fixtures::atlases::load("stick-figure").expect("atlas fixture");
    let data = Arc::new(SkeletonData::from_json(&doc, Arc::new(atlas)).expect("fixture"));
    let mut rt = SkeletonRuntime::from_data(data, None, RuntimeConfig::default())
        .expect("fixture runtime");
    rt.run_animation("walk", Repeat::Forever).expect("walk exists");

    c.bench_function("stick_figure_tick_and_resolve", |b| {
        b.iter(|| {
            rt.activate_animations(black_box(1.0 / 60.0));
            black_box(rt.skin_slots());
        })
    });
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
