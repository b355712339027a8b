use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use enzkin::prelude::*;

fn setup_simulation(dt: f64) -> (SimulationSetup, KineticParameters) {
    let setup = SimulationSetupBuilder::default()
        .dt(dt)
        .t1(1400.0)
        .initial_substrate(50.0)
        .initial_product(0.0)
        .build()
        .expect("Failed to build simulation setup");

    (setup, KineticParameters::new(0.0596, 5.0))
}

fn benchmark_simulation(c: &mut Criterion) {
    let (setup, params) = setup_simulation(10.0);
    let (fine_setup, _) = setup_simulation(0.01);
    let adaptive = AdaptiveSetup::default();

    c.bench_function("euler_integration", |b| {
        b.iter(|| {
            let _ = black_box(EulerIntegrator::new(black_box(setup)).integrate(&params));
        });
    });

    c.bench_function("fine_euler_integration", |b| {
        b.iter(|| {
            let _ = black_box(EulerIntegrator::new(black_box(fine_setup)).integrate(&params));
        });
    });

    c.bench_function("adaptive_integration", |b| {
        b.iter(|| {
            let _ = black_box(integrate_adaptive(
                black_box(&adaptive),
                black_box(&setup),
                &params,
            ));
        });
    });
}

fn benchmark_fit(c: &mut Criterion) {
    c.bench_function("levenberg_marquardt_reference", |b| {
        b.iter(|| {
            let _ = black_box(curve_fit(
                MichaelisMenten,
                black_box(&REFERENCE_CONCENTRATIONS),
                black_box(&REFERENCE_VELOCITIES),
                [1500.0, 80.0],
            ));
        });
    });
}

criterion_group!(benches, benchmark_simulation, benchmark_fit);
criterion_main!(benches);
