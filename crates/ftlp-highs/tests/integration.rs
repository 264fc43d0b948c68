#![allow(clippy::float_cmp)]

mod support;

use std::sync::Arc;
use std::thread;

use ftlp_core::{CsrBatch, ErrorKind, SessionState, SparseRowCache};
use ftlp_solver::{SolverConfig, SolverStatus};
use support::{assert_close, init_tracing, market_split, session, session_with_cache};

/// maximize x0 + x1 subject to x0 + x1 <= 8, 0 <= x <= 10
#[test]
fn test_two_column_example_scores_eight() {
    init_tracing();
    let mut session = session(2);
    let infinity = session.infinity().unwrap();
    session.set_column_bounds(&[0.0, 0.0], &[10.0, 10.0]).unwrap();
    session.set_objective(&[1.0, 1.0]).unwrap();
    session.add_sparse_row(&[1.0, 1.0], &[0, 1], -infinity, 8.0).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_eq!(session.state(), SessionState::Solved);
    assert_close(session.score().unwrap(), 8.0);

    let values = session.column_solution().unwrap();
    assert_eq!(values.len(), 2);
    assert_close(values[0] + values[1], 8.0);

    let solution = session.solution().unwrap();
    assert_eq!(solution.row_values.len(), 1);
    assert_close(solution.row_values[0], 8.0);
    assert!(solution.mip_gap.is_nan());
}

#[test]
fn test_rowless_model_hits_box_optimum() {
    let mut session = session(3);
    session
        .set_column_bounds(&[0.0, -2.0, 1.0], &[3.0, 5.0, 4.0])
        .unwrap();
    session.set_objective(&[2.0, -1.0, 0.5]).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    // 2 * 3 - 1 * (-2) + 0.5 * 4
    assert_close(session.score().unwrap(), 10.0);
    let values = session.column_solution().unwrap();
    assert_close(values[0], 3.0);
    assert_close(values[1], -2.0);
    assert_close(values[2], 4.0);
}

#[test]
fn test_contradictory_rows_are_infeasible() {
    let mut session = session(1);
    let infinity = session.infinity().unwrap();
    session.set_column_bounds(&[0.0], &[10.0]).unwrap();
    session.set_objective(&[1.0]).unwrap();
    session.add_dense_row(&[1.0], 5.0, infinity).unwrap();
    session.add_dense_row(&[1.0], -infinity, 1.0).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Infeasible);
    assert_eq!(session.state(), SessionState::Solved);
    assert_eq!(session.column_solution().unwrap().len(), 1);
    assert_eq!(session.score().unwrap(), f64::NEG_INFINITY);
}

#[test]
fn test_unbounded_objective() {
    let mut session = session(2);
    session.set_objective(&[1.0, 0.0]).unwrap();
    session
        .add_sparse_row(&[1.0], &[1], f64::NEG_INFINITY, 4.0)
        .unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Unbounded);
    assert_eq!(session.column_solution().unwrap().len(), 2);
}

/// Infeasible rows next to an unbounded free column must still read as
/// infeasible, not unbounded.
#[test]
fn test_infeasible_mip_with_unbounded_ray_is_infeasible() {
    let mut session = session(2);
    session
        .set_column_bounds(&[0.0, f64::NEG_INFINITY], &[1.0, f64::INFINITY])
        .unwrap();
    session.set_column_integrality(&[true, true]).unwrap();
    session.set_objective(&[1.0, 1.0]).unwrap();
    session
        .add_sparse_row(&[1.0], &[0], 2.0, f64::INFINITY)
        .unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Infeasible);
    assert_eq!(session.score().unwrap(), f64::NEG_INFINITY);
}

#[test]
fn test_integrality_is_enforced() {
    let mut session = session(1);
    session.set_column_bounds(&[0.0], &[10.0]).unwrap();
    session.set_column_integrality(&[true]).unwrap();
    session.set_objective(&[1.0]).unwrap();
    session.add_dense_row(&[1.0], f64::NEG_INFINITY, 1.5).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_close(session.column_solution().unwrap()[0], 1.0);
    assert!(!session.solution().unwrap().mip_gap.is_nan());
}

#[test]
fn test_dense_and_sparse_rows_score_the_same() {
    let rows: [(&[f64], f64, f64); 3] = [
        (&[1.0, 0.0, 2.0, 0.0], f64::NEG_INFINITY, 6.0),
        (&[0.0, 3.0, 0.0, 1.0], f64::NEG_INFINITY, 9.0),
        (&[1.0, 1.0, 1.0, 1.0], 1.0, 5.0),
    ];
    let objective = [3.0, 2.0, 4.0, 1.0];
    let upper = [4.0; 4];

    let mut dense = session(4);
    let mut sparse = session(4);
    for session in [&mut dense, &mut sparse] {
        session.set_column_bounds(&[0.0; 4], &upper).unwrap();
        session.set_objective(&objective).unwrap();
    }
    for (coefficients, lower, upper) in rows {
        dense.add_dense_row(coefficients, lower, upper).unwrap();
        let (indices, values): (Vec<i32>, Vec<f64>) = coefficients
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(index, value)| (index as i32, *value))
            .unzip();
        sparse.add_sparse_row(&values, &indices, lower, upper).unwrap();
    }

    assert_eq!(dense.solve().unwrap(), SolverStatus::Optimal);
    assert_eq!(sparse.solve().unwrap(), SolverStatus::Optimal);
    assert_close(dense.score().unwrap(), sparse.score().unwrap());
}

#[test]
fn test_cached_rows_are_transparent() {
    let cache = Arc::new(SparseRowCache::new());
    let mut cached = session_with_cache(3, Arc::clone(&cache));
    let mut plain = session(3);
    for session in [&mut cached, &mut plain] {
        session
            .set_column_bounds(&[0.0; 3], &[5.0, 5.0, 5.0])
            .unwrap();
        session.set_objective(&[1.0, 2.0, 3.0]).unwrap();
    }

    for (lower, upper) in [(f64::NEG_INFINITY, 7.0), (f64::NEG_INFINITY, 6.0)] {
        cached
            .add_sparse_row_cached(&[1.0, 1.0], &[2, 1], lower, upper)
            .unwrap();
        plain
            .add_sparse_row(&[1.0, 1.0], &[2, 1], lower, upper)
            .unwrap();
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cached.model().unwrap().num_shared_rows(), 2);

    assert_eq!(cached.solve().unwrap(), SolverStatus::Optimal);
    assert_eq!(plain.solve().unwrap(), SolverStatus::Optimal);
    assert_close(cached.score().unwrap(), plain.score().unwrap());
    // x2 = 5, x1 = 1, x0 = 5
    assert_close(cached.score().unwrap(), 22.0);
}

#[test]
fn test_batch_rows_solve_like_sequential_rows() {
    let row_starts = [0, 2, 4];
    let column_indices = [0, 1, 1, 2];
    let coefficients = [1.0, 2.0, 1.0, 1.0];
    let lower = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    let upper = [4.0, 3.0];

    let mut batched = session(3);
    let mut sequential = session(3);
    for session in [&mut batched, &mut sequential] {
        session.set_column_bounds(&[0.0; 3], &[10.0; 3]).unwrap();
        session.set_objective(&[1.0, 1.0, 1.0]).unwrap();
    }
    batched
        .add_sparse_rows(
            2,
            CsrBatch {
                row_starts: &row_starts,
                column_indices: &column_indices,
                coefficients: &coefficients,
                lower: &lower,
                upper: &upper,
            },
        )
        .unwrap();
    for row in 0..2 {
        let span = row_starts[row] as usize..row_starts[row + 1] as usize;
        sequential
            .add_sparse_row(
                &coefficients[span.clone()],
                &column_indices[span],
                lower[row],
                upper[row],
            )
            .unwrap();
    }

    assert_eq!(batched.solve().unwrap(), SolverStatus::Optimal);
    assert_eq!(sequential.solve().unwrap(), SolverStatus::Optimal);
    assert_close(batched.score().unwrap(), sequential.score().unwrap());
    assert_close(batched.score().unwrap(), 7.0);
}

#[test]
fn test_tiny_time_limit_returns_time_limit_with_full_vector() {
    init_tracing();
    let num_columns = 60;
    let mut session = session(num_columns);
    market_split(&mut session, num_columns, 8);
    session.set_time_limit(0.001).unwrap();

    let status = session.solve().unwrap();
    assert_eq!(status, SolverStatus::TimeLimit);
    assert_eq!(session.state(), SessionState::Solved);
    assert_eq!(session.column_solution().unwrap().len(), num_columns);
}

#[test]
fn test_start_point_is_advisory() {
    let mut session = session(2);
    session.set_column_bounds(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
    session.set_column_integrality(&[true, true]).unwrap();
    session.set_objective(&[1.0, 2.0]).unwrap();
    session
        .add_dense_row(&[1.0, 1.0], f64::NEG_INFINITY, 1.0)
        .unwrap();
    session.set_column_start(&[1.0, 0.0]).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_close(session.score().unwrap(), 2.0);
}

#[test]
fn test_config_is_applied() {
    let mut session = session(1);
    session
        .set_config(
            SolverConfig::new()
                .with_presolve(false)
                .with_threads(1)
                .with_mip_gap(0.0)
                .with_tolerance(1e-7),
        )
        .unwrap();
    session.set_column_bounds(&[0.0], &[2.0]).unwrap();
    session.set_objective(&[1.0]).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_close(session.score().unwrap(), 2.0);
}

#[test]
fn test_column_free_session() {
    let mut session = session(0);
    session.add_dense_row(&[], -1.0, 1.0).unwrap();
    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_eq!(session.score().unwrap(), 0.0);
    assert!(session.column_solution().unwrap().is_empty());
}

#[test]
fn test_bounds_pinned_at_infinity_are_rejected_before_solve() {
    let mut session = session(1);
    let err = session
        .set_column_bounds(&[f64::INFINITY], &[f64::INFINITY])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = session
        .add_dense_row(&[1.0], f64::NEG_INFINITY, f64::NEG_INFINITY)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    session.set_objective(&[1.0]).unwrap();
    session.set_column_bounds(&[0.0], &[1.0]).unwrap();
    assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
    assert_close(session.score().unwrap(), 1.0);
}

#[test]
fn test_huge_coefficient_fails_the_session() {
    init_tracing();
    let mut session = session(2);
    session.set_column_bounds(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
    session.set_objective(&[1.0, 1.0]).unwrap();
    session
        .add_sparse_row(&[1e16, 1.0], &[0, 1], f64::NEG_INFINITY, 1.0)
        .unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Error);
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.status(), Some(SolverStatus::Error));
    assert_eq!(
        session.score().unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}

#[test]
fn test_rejected_option_fails_the_session() {
    let mut session = session(1);
    session
        .set_config(SolverConfig::new().with_tolerance(0.0))
        .unwrap();
    session.set_column_bounds(&[0.0], &[2.0]).unwrap();
    session.set_objective(&[1.0]).unwrap();

    assert_eq!(session.solve().unwrap(), SolverStatus::Error);
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.solve().unwrap_err().kind(), ErrorKind::InvalidState);
    assert!(session.dispose());
}

#[test]
fn test_lifecycle_errors_with_real_backend() {
    let mut session = session(2);
    assert_eq!(
        session.score().unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    session.solve().unwrap();
    assert_eq!(session.solve().unwrap_err().kind(), ErrorKind::InvalidState);
    assert!(session.dispose());
    assert_eq!(
        session.column_solution().unwrap_err().kind(),
        ErrorKind::UseAfterDispose
    );
}

#[test]
fn test_parallel_sessions_are_independent() {
    let cache = Arc::new(SparseRowCache::new());
    let handles: Vec<_> = (1..=6)
        .map(|cap| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut session = session_with_cache(2, cache);
                session.set_column_bounds(&[0.0, 0.0], &[100.0, 100.0]).unwrap();
                session.set_objective(&[1.0, 1.0]).unwrap();
                session
                    .add_sparse_row_cached(&[1.0, 1.0], &[0, 1], f64::NEG_INFINITY, cap as f64)
                    .unwrap();
                assert_eq!(session.solve().unwrap(), SolverStatus::Optimal);
                (cap, session.score().unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (cap, score) = handle.join().unwrap();
        assert_close(score, cap as f64);
    }
    assert_eq!(cache.len(), 1);
}
