//! Readout calibration, SPAM correction and PyGSTi export.

use std::io::Cursor;
use std::sync::Arc;

use qbench_adapter_sim::{ReadoutError, SimulatorBackend};
use qbench_bench::{
    CircuitFidelity, ConfusionMatrix, MemoryCache, Metric, PyGstiBenchmark, PyGstiDataset,
    PyGstiResults, Rotation, RotationSweep, Session, SpamBenchmark, SpamConfusionMatrix, Task,
    TaskRunner,
};
use qbench_hal::Bitstring;

fn noisy_session(shots: u32, seed: u64) -> Session {
    let backend = SimulatorBackend::new()
        .with_seed(seed)
        .with_readout_error(ReadoutError::Uniform {
            p01: 0.04,
            p10: 0.08,
        });
    Session::new(Arc::new(backend), shots).unwrap()
}

fn calibrate(cache: &MemoryCache) -> SpamConfusionMatrix {
    let metric = ConfusionMatrix::new(SpamBenchmark::new(2, noisy_session(200_000, 1)).unwrap());
    let values = metric.evaluate(cache, false, false, None).unwrap();
    SpamConfusionMatrix::new(values.into_values().next().unwrap()).unwrap()
}

// ============================================================================
// SPAM correction
// ============================================================================

#[test]
fn test_spam_correction_recovers_ideal_distribution() {
    let cache = MemoryCache::new();
    let spam = calibrate(&cache);
    assert_eq!(spam.num_qubits(), 2);

    let sweep = RotationSweep::new(
        vec![Rotation::X, Rotation::Y],
        0.0,
        90.0,
        3,
        noisy_session(200_000, 2),
    )
    .unwrap();
    let mut runner = TaskRunner::new(&cache);
    runner.run(&sweep, &[Task::MeasureCounts], false, false).unwrap();
    let measured = runner.artifact(Task::MeasureCounts).unwrap().counts().unwrap();
    let corrected = spam.correct_all(measured).unwrap();

    for ((counts, raw), ideal) in corrected.iter().zip(measured).zip(sweep.ideal_probabilities()) {
        assert_eq!(counts.total(), raw.total());
        for (p, q) in counts.probabilities().iter().zip(&ideal) {
            assert!((p - q).abs() < 0.01, "corrected {p} vs ideal {q}");
        }
    }
}

#[test]
fn test_spam_correction_raises_circuit_fidelity() {
    let cache = MemoryCache::new();
    let spam = calibrate(&cache);
    let sweep =
        RotationSweep::new(vec![Rotation::X, Rotation::I], 180.0, 180.0, 2, noisy_session(100_000, 3))
            .unwrap();
    let metric = CircuitFidelity::new(sweep);

    let raw = metric.evaluate(&cache, false, false, None).unwrap();
    let corrected = metric.evaluate(&cache, false, false, Some(&spam)).unwrap();
    assert_eq!(raw.keys().collect::<Vec<_>>(), corrected.keys().collect::<Vec<_>>());

    let raw = raw.into_values().next().unwrap();
    let corrected = corrected.into_values().next().unwrap();
    for (r, c) in raw.iter().zip(&corrected) {
        assert!(*r < 0.95, "uncorrected fidelity {r}");
        assert!(*c > 0.99, "corrected fidelity {c}");
    }
}

// ============================================================================
// PyGSTi
// ============================================================================

#[test]
fn test_pygsti_dataset_round_trip() {
    let input = "\
# two-qubit germs
{}@(0,1)
Gxpi2:0Gxpi2:0@(0,1)
Gxpi2:0Gxpi2:0Gcnot:0:1@(0,1)
(Gxpi2:1)^4@(0,1)
";
    let session = Session::new(Arc::new(SimulatorBackend::new().with_seed(5)), 1000).unwrap();
    let workflow = PyGstiBenchmark::new(Cursor::new(input), 2, session).unwrap();
    let metric = PyGstiResults::new(workflow);
    let cache = MemoryCache::new();

    let dataset = metric
        .evaluate(&cache, false, false, None)
        .unwrap()
        .into_values()
        .next()
        .unwrap();
    assert_eq!(dataset.rows().len(), 4);

    let text = dataset.to_text();
    assert!(text.starts_with("## Columns = 00 count, 01 count, 10 count, 11 count\n"));
    let parsed = PyGstiDataset::parse(&text).unwrap();
    assert_eq!(parsed, dataset);

    let bits = |s: &str| s.parse::<Bitstring>().unwrap();
    assert_eq!(parsed.get("{}@(0,1)", &bits("00")), Some(1000));
    assert_eq!(parsed.get("Gxpi2:0Gxpi2:0@(0,1)", &bits("10")), Some(1000));
    assert_eq!(parsed.get("Gxpi2:0Gxpi2:0Gcnot:0:1@(0,1)", &bits("11")), Some(1000));
    assert_eq!(parsed.get("(Gxpi2:1)^4@(0,1)", &bits("00")), Some(1000));
    for counts in parsed.counts().unwrap() {
        assert_eq!(counts.total(), 1000);
    }
}

#[test]
fn test_pygsti_unlabelled_single_qubit_list() {
    let input = "{}\nGxpiGxpi\nGxpi\n";
    let session = Session::new(Arc::new(SimulatorBackend::new().with_seed(9)), 400).unwrap();
    let workflow = PyGstiBenchmark::new(Cursor::new(input), 1, session).unwrap();
    let cache = MemoryCache::new();

    let dataset = PyGstiResults::new(workflow)
        .evaluate(&cache, false, false, None)
        .unwrap()
        .into_values()
        .next()
        .unwrap();

    let counts: Vec<Vec<u64>> = dataset.rows().iter().map(|row| row.counts.clone()).collect();
    assert_eq!(counts, vec![vec![400, 0], vec![400, 0], vec![0, 400]]);
    assert_eq!(dataset.rows()[1].circuit, "GxpiGxpi");
}

#[test]
fn test_pygsti_lists_do_not_share_cached_runs() {
    let cache = MemoryCache::new();
    let evaluate = |input: &str| {
        let session = Session::new(Arc::new(SimulatorBackend::new().with_seed(9)), 300).unwrap();
        let workflow = PyGstiBenchmark::new(Cursor::new(input), 1, session).unwrap();
        PyGstiResults::new(workflow)
            .evaluate(&cache, false, false, None)
            .unwrap()
            .into_values()
            .next()
            .unwrap()
    };

    let identity = evaluate("{}\n");
    assert_eq!(identity.rows()[0].counts, vec![300, 0]);

    // A different list must execute rather than reuse the first run.
    let flipped = evaluate("Gxpi:0\n");
    assert_eq!(flipped.rows()[0].circuit, "Gxpi:0");
    assert_eq!(flipped.rows()[0].counts, vec![0, 300]);
}
