#![allow(dead_code)]

use std::sync::Arc;

use ftlp_core::{Session, SparseRowCache};
use ftlp_highs::HighsBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TOLERANCE: f64 = 1e-6;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn session(num_columns: usize) -> Session<HighsBackend> {
    session_with_cache(num_columns, Arc::new(SparseRowCache::new()))
}

pub fn session_with_cache(
    num_columns: usize,
    cache: Arc<SparseRowCache>,
) -> Session<HighsBackend> {
    Session::new(num_columns, 0, HighsBackend::new(), cache).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

/// A market-split instance: equality rows over binaries with right-hand side
/// half the row sum. Small time limits stop these long before optimality.
pub fn market_split(session: &mut Session<HighsBackend>, num_columns: usize, num_rows: usize) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    session.set_column_bounds(&vec![0.0; num_columns], &vec![1.0; num_columns]).unwrap();
    session.set_column_integrality(&vec![true; num_columns]).unwrap();
    let objective: Vec<f64> = (0..num_columns)
        .map(|_| f64::from(rng.random_range(0..100_u32)))
        .collect();
    session.set_objective(&objective).unwrap();
    for _ in 0..num_rows {
        let coefficients: Vec<f64> = (0..num_columns)
            .map(|_| f64::from(rng.random_range(0..100_u32)))
            .collect();
        let rhs = (coefficients.iter().sum::<f64>() / 2.0).floor();
        session.add_dense_row(&coefficients, rhs, rhs).unwrap();
    }
}
