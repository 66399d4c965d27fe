//! Baseline performance of full call center runs.
#![allow(clippy::missing_docs_in_private_items, clippy::expect_used)]
#[macro_use]
extern crate criterion;

use criterion::criterion_group;
use criterion::Criterion;
use callsim::call_center::simulate;
use callsim::Config;

fn call_center_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("call center");

    group.bench_function("default day", |b| {
        let config = Config::default();
        b.iter(|| simulate(&config).expect("valid config"));
    });

    group.bench_function("busy shift", |b| {
        let config = Config {
            sim_time: 480.0,
            num_agents: 8,
            arrival_gap: 0.5,
            service_time: 3.5,
            ..Default::default()
        };
        b.iter(|| simulate(&config).expect("valid config"));
    });
}

criterion_group!(benches, call_center_bench);
criterion_main!(benches);
