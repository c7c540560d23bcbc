//! Benchmarks for controlled-gate decomposition
//!
//! Run with: cargo bench -p qsynth-decompose

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qsynth_decompose::{
    DecomposeConfig, Decomposer, PhaseStrategy, RotationAxis, multiplexed_phase,
    multiplexed_rotation,
};
use qsynth_ir::{Circuit, Control, QubitId, Unitary2x2};

/// Benchmark Gray-code rotations as the control count grows
fn bench_multiplexed_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiplexed_rotation");

    for num_controls in &[2u32, 4, 8, 12] {
        let controls: Vec<QubitId> = (0..*num_controls).map(QubitId).collect();
        group.bench_with_input(
            BenchmarkId::new("rz", num_controls),
            num_controls,
            |b, &n| {
                b.iter(|| {
                    let mut circuit = Circuit::with_size("bench", n + 1);
                    multiplexed_rotation(
                        &mut circuit,
                        RotationAxis::Z,
                        black_box(0.7),
                        &controls,
                        QubitId(n),
                    )
                    .unwrap();
                    circuit
                });
            },
        );
    }

    group.finish();
}

/// Benchmark both multiplexed-phase strategies
fn bench_multiplexed_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiplexed_phase");

    for num_qubits in &[4u32, 16, 64] {
        let qubits: Vec<QubitId> = (0..*num_qubits).map(QubitId).collect();
        for strategy in [PhaseStrategy::BorrowedAncilla, PhaseStrategy::AncillaFree] {
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), num_qubits),
                num_qubits,
                |b, &n| {
                    b.iter(|| {
                        let mut circuit = Circuit::with_size("bench", n);
                        multiplexed_phase(&mut circuit, &qubits, black_box(0.3), strategy)
                            .unwrap();
                        circuit
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark arbitrary controlled unitaries through the dispatcher
fn bench_controlled_unitary(c: &mut Criterion) {
    let mut group = c.benchmark_group("controlled_unitary");
    let decomposer = Decomposer::new(DecomposeConfig::default());
    let u = Unitary2x2::u3(1.1, 0.4, -0.9) * Unitary2x2::global_phase(0.25);

    for num_controls in &[1u32, 8, 32] {
        let controls: Vec<Control> = (0..*num_controls)
            .map(|q| Control::with_polarity(QubitId(q), q % 2 == 0))
            .collect();
        group.bench_with_input(
            BenchmarkId::new("abc", num_controls),
            num_controls,
            |b, &n| {
                b.iter(|| {
                    let mut circuit = Circuit::with_size("bench", n + 1);
                    decomposer
                        .decompose_unitary(&mut circuit, black_box(&u), &controls, QubitId(n))
                        .unwrap();
                    circuit
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_multiplexed_rotation,
    bench_multiplexed_phase,
    bench_controlled_unitary
);
criterion_main!(benches);
