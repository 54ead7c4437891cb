//! Penalised least squares.
//!
//! The decomposition model is linear in its coefficients, so fitting it is a
//! ridge regression
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ λ_j β_j^2
//! ```
//!
//! solved by appending one row `sqrt(λ_j) e_j` per penalised column (target 0)
//! and running an ordinary SVD least-squares solve on the stacked system. A
//! different `λ_j` per column lets the trend changepoints, seasonal terms and
//! holiday effects each carry their own prior.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if a strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ridge regression with one penalty per column of `x`.
///
/// `penalties.len()` must equal `x.ncols()`; a zero penalty leaves the column
/// unregularised.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    let (rows, cols) = x.shape();
    if penalties.len() != cols || y.len() != rows {
        return None;
    }

    let penalised: Vec<(usize, f64)> = penalties
        .iter()
        .enumerate()
        .filter(|(_, lambda)| **lambda > 0.0)
        .map(|(j, lambda)| (j, lambda.sqrt()))
        .collect();

    let mut stacked = DMatrix::<f64>::zeros(rows + penalised.len(), cols);
    stacked.view_mut((0, 0), (rows, cols)).copy_from(x);
    for (k, (j, root)) in penalised.iter().enumerate() {
        stacked[(rows + k, *j)] = *root;
    }

    let mut target = DVector::<f64>::zeros(rows + penalised.len());
    target.rows_mut(0, rows).copy_from(y);

    solve_least_squares(&stacked, &target)
}
