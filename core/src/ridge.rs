//! Ridge regression (L2-regularized least squares) with intercept.
//!
//! Minimizes ||y - Xβ - b||² + α||β||². The intercept is not penalized:
//! X and y are centered, the system (XᵀX + αI)β = Xᵀy is solved by Cholesky,
//! and b = ȳ - x̄·β.

use crate::error::{DnaError, DnaResult};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct RidgeModel {
    alpha:        f64,
    coefficients: Array1<f64>,
    intercept:    f64,
}

/// Serializable form of a fitted model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RidgeParams {
    pub alpha:        f64,
    pub coefficients: Vec<f64>,
    pub intercept:    f64,
}

impl RidgeModel {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> DnaResult<Self> {
        if alpha <= 0.0 || !alpha.is_finite() {
            return Err(DnaError::Model(format!("invalid ridge alpha {alpha}")));
        }
        if x.nrows() != y.len() {
            return Err(DnaError::Model(format!(
                "{} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| DnaError::Model("cannot fit on zero rows".into()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| DnaError::Model("cannot fit on zero targets".into()))?;

        let xc = x - &x_mean;
        let yc = y - y_mean;

        let mut gram = xc.t().dot(&xc);
        for i in 0..gram.nrows() {
            gram[[i, i]] += alpha;
        }
        let rhs = xc.t().dot(&yc);

        let coefficients = cholesky_solve(&gram, &rhs)?;
        let intercept = y_mean - x_mean.dot(&coefficients);

        Ok(Self {
            alpha,
            coefficients,
            intercept,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> DnaResult<f64> {
        if row.len() != self.n_features() {
            return Err(DnaError::FeatureMismatch {
                expected: self.n_features(),
                actual:   row.len(),
            });
        }
        Ok(self.intercept + row.dot(&self.coefficients))
    }

    pub fn predict(&self, x: &Array2<f64>) -> DnaResult<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(DnaError::FeatureMismatch {
                expected: self.n_features(),
                actual:   x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    /// Coefficient of determination on (x, y). 1.0 is a perfect fit.
    pub fn r_squared(&self, x: &Array2<f64>, y: &Array1<f64>) -> DnaResult<f64> {
        let predictions = self.predict(x)?;
        let y_mean = y.mean().unwrap_or(0.0);
        let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
        let ss_res: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(v, p)| (v - p).powi(2))
            .sum();
        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn params(&self) -> RidgeParams {
        RidgeParams {
            alpha:        self.alpha,
            coefficients: self.coefficients.to_vec(),
            intercept:    self.intercept,
        }
    }

    pub fn from_params(params: &RidgeParams) -> Self {
        Self {
            alpha:        params.alpha,
            coefficients: Array1::from(params.coefficients.clone()),
            intercept:    params.intercept,
        }
    }
}

/// Solve A·x = b for symmetric positive-definite A.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> DnaResult<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    // A = L·Lᵀ
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return Err(DnaError::Model("matrix is not positive definite".into()));
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L·z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ·x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(x)
}
