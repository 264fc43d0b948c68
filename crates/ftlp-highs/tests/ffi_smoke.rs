use ftlp_highs::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, highs_infinity, highs_version,
};

#[test]
fn test_maximize_simple() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // maximize x subject to x <= 3
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, highs_infinity(), 1.0);
    model
        .add_row(-highs_infinity(), 3.0, &[x as u32], &[1.0])
        .expect("failed to add row");
    model
        .set_primal_start(vec![1.0])
        .expect("failed to set primal start");

    let status = model.solve().expect("solve failed");
    assert_eq!(status, HighsStatus::Optimal);
    assert_eq!(model.columns(), 0);
    assert!(model.has_feasible_primal());

    let objective = model.objective_value().expect("missing objective value");
    let snapshot = model.solution_snapshot().expect("missing solution");
    assert!(
        (objective - 3.0).abs() < 1e-6,
        "Expected objective value ~3.0, got {}",
        objective
    );
    assert!((snapshot.col_values()[x] - 3.0).abs() < 1e-6);
    assert!((snapshot.row_values()[0] - 3.0).abs() < 1e-6);
}

#[test]
fn test_integer_column_is_enforced() {
    let mut model = HighsModel::new();
    let x = model.add_integer_col(0.0, 10.0, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 2.5, &[x as u32], &[1.0])
        .expect("failed to add row");
    model.set_option("mip_rel_gap", HighsOption::Float(0.0));

    assert_eq!(model.solve(), Ok(HighsStatus::Optimal));
    let snapshot = model.solution_snapshot().expect("missing solution");
    assert!(
        (snapshot.col_values()[x] - 2.0).abs() < 1e-6,
        "Expected integer x = 2.0, got {}",
        snapshot.col_values()[x]
    );
}

#[test]
fn test_rejected_option_is_an_error_and_resets_the_model() {
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, 1.0, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 1.0, &[x as u32], &[1.0])
        .expect("failed to add row");
    model.set_option("primal_feasibility_tolerance", HighsOption::Float(0.0));

    assert_eq!(
        model.solve(),
        Err(HighsModelError::OptionRejected {
            option: "primal_feasibility_tolerance".to_string()
        })
    );
    assert_eq!(model.columns(), 0);
    assert!(model.solution_snapshot().is_err());
}

#[test]
fn test_inconsistent_bounds_are_rejected_without_panicking() {
    let mut model = HighsModel::new();
    model.add_col(f64::INFINITY, f64::INFINITY, 1.0);
    assert!(matches!(
        model.solve(),
        Err(HighsModelError::ProblemRejected { .. })
    ));
}

#[test]
fn test_huge_matrix_value_is_rejected_without_panicking() {
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, 1.0, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 1.0, &[x as u32], &[1e16])
        .expect("failed to add row");
    assert!(model.solve().is_err());
}

#[test]
fn test_primal_start_length_mismatch() {
    let mut model = HighsModel::new();
    model.add_col(0.0, 1.0, 1.0);
    assert!(model.set_primal_start(vec![0.0, 1.0]).is_err());
}

#[test]
fn test_version_is_reported() {
    let version = highs_version().expect("missing HiGHS version");
    assert!(!version.is_empty());
}
