// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use toastline::clock::ManualClock;
use toastline::config::{defaults::INFINITE, ToasterOptions};
use toastline::store::{FrameQueue, Store};
use toastline::toast::ToastOptions;
use toastline::toaster::{SimulatedProbe, Toaster};

fn frame_store() -> (FrameQueue, Store) {
    let frames = FrameQueue::new();
    let store = Store::with_scheduler(Arc::new(frames.clone()));
    (frames, store)
}

fn store_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for subscribers in [0_usize, 1, 8] {
        group.bench_with_input(
            BenchmarkId::new("create", subscribers),
            &subscribers,
            |b, &subscribers| {
                let (_, store) = frame_store();
                let _subscriptions: Vec<_> = (0..subscribers)
                    .map(|_| store.subscribe(|event| {
                        black_box(event);
                    }))
                    .collect();
                b.iter(|| black_box(store.message("Saved", ToastOptions::new())));
            },
        );
    }

    group.bench_function("update_same_id", |b| {
        let (_, store) = frame_store();
        b.iter(|| black_box(store.success("Updated", ToastOptions::new().id("stable"))));
    });

    group.bench_function("dismiss_and_frame", |b| {
        let (frames, store) = frame_store();
        let id = store.message("bye", ToastOptions::new());
        b.iter(|| {
            store.dismiss(id.clone());
            black_box(frames.run_frame());
        });
    });

    group.finish();
}

fn toaster_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("toaster");

    group.bench_function("tick_with_50_toasts", |b| {
        let (_, store) = frame_store();
        let clock = Arc::new(ManualClock::new());
        let mut toaster = Toaster::builder(store.clone(), ToasterOptions::default())
            .clock(clock.clone())
            .probe(Arc::new(SimulatedProbe::new(false)))
            .build();
        for n in 0..50 {
            store.message(
                format!("toast {n}"),
                ToastOptions::new().duration(INFINITE),
            );
        }
        toaster.tick();
        b.iter(|| {
            clock.advance(Duration::from_millis(16));
            toaster.tick();
            black_box(toaster.view());
        });
    });

    group.finish();
}

criterion_group!(benches, store_benchmark, toaster_benchmark);
criterion_main!(benches);
