// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_settings`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

use understory_settings::{SettingKey, Settings};

fn bench_settings(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: Settings={} SettingKey<f64>={}",
            core::mem::size_of::<Settings>(),
            core::mem::size_of::<SettingKey<f64>>(),
        );
    });

    let width: SettingKey<f64> = SettingKey::builder("width").default_value(0.0).build();
    let derived = SettingKey::builder("derived")
        .default_with({
            let width = width.clone();
            move |settings: &Settings| settings.get(&width).map(|w| w * 2.0)
        })
        .build();
    let text: SettingKey<String> = SettingKey::builder("text").default_value(String::new()).build();

    let mut group = c.benchmark_group("settings/get");

    group.bench_function("set", |b| {
        let settings = Settings::new();
        settings.set(&width, 100.0);
        b.iter(|| black_box(settings.get(&width)))
    });

    group.bench_function("default_memoized", |b| {
        let settings = Settings::new();
        let _ = settings.get(&derived);
        b.iter(|| black_box(settings.get(&derived)))
    });

    group.bench_function("default_first_read", |b| {
        b.iter_batched(
            Settings::new,
            |settings| {
                black_box(settings.get(&derived));
                black_box(settings);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("string_clone", |b| {
        let settings = Settings::new();
        settings.set(&text, "hello world hello world hello world".to_string());
        b.iter(|| black_box(settings.get(&text)))
    });

    group.bench_function("is_set", |b| {
        let settings = Settings::new();
        settings.set(&width, 100.0);
        b.iter(|| black_box(settings.is_set(&width)))
    });

    group.finish();

    let mut group = c.benchmark_group("settings/set");

    group.bench_function("no_listener", |b| {
        let settings = Settings::new();
        let mut value = 0.0_f64;
        b.iter(|| {
            value += 1.0;
            settings.set(&width, black_box(value));
        })
    });

    group.bench_function("unchanged", |b| {
        let settings = Settings::new();
        settings.set(&width, 1.0);
        b.iter(|| settings.set(&width, black_box(1.0_f64)))
    });

    for listeners in [1_usize, 4, 16] {
        group.bench_function(BenchmarkId::new("listeners", listeners), |b| {
            let settings = Settings::new();
            let hits = Rc::new(Cell::new(0_u64));
            for _ in 0..listeners {
                let hits = hits.clone();
                settings.add_listener(&width, move |_, _, _, _| hits.set(hits.get() + 1));
            }
            let mut value = 0.0_f64;
            b.iter(|| {
                value += 1.0;
                settings.set(&width, black_box(value));
            });
            black_box(hits.get());
        });
    }

    group.bench_function("toggle_to_default", |b| {
        let settings = Settings::new();
        b.iter(|| {
            settings.set(&width, 5.0);
            settings.to_default(&width);
        })
    });

    group.finish();

    let mut group = c.benchmark_group("settings/listeners");

    group.bench_function("add_remove", |b| {
        let settings = Settings::new();
        b.iter(|| {
            let id = settings.add_listener(&width, |_, _, _, _| {});
            black_box(settings.remove_listener(&width, id))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_settings);
criterion_main!(benches);
