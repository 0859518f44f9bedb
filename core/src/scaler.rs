//! Per-feature standardization: (x - mean) / std.
//!
//! Uses the population standard deviation. Constant columns scale by 1.

use crate::error::{DnaError, DnaResult};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean:  Array1<f64>,
    scale: Array1<f64>,
}

/// Serializable form of a fitted scaler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalerParams {
    pub mean:  Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> DnaResult<Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| DnaError::Model("cannot fit scaler on zero rows".into()))?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = Array1::from_iter(std.iter().zip(mean.iter()).map(|(&s, &m)| {
            // Rounding noise on a constant column counts as zero variance.
            let floor = 10.0 * f64::EPSILON * m.abs().max(1.0);
            if s.is_finite() && s > floor {
                s
            } else {
                1.0
            }
        }));
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> DnaResult<Array2<f64>> {
        self.check_width(x.ncols())?;
        Ok((x - &self.mean) / &self.scale)
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> DnaResult<Array1<f64>> {
        self.check_width(row.len())?;
        Ok((&row - &self.mean) / &self.scale)
    }

    pub fn params(&self) -> ScalerParams {
        ScalerParams {
            mean:  self.mean.to_vec(),
            scale: self.scale.to_vec(),
        }
    }

    pub fn from_params(params: &ScalerParams) -> DnaResult<Self> {
        if params.mean.len() != params.scale.len() {
            return Err(DnaError::FeatureMismatch {
                expected: params.mean.len(),
                actual:   params.scale.len(),
            });
        }
        Ok(Self {
            mean:  Array1::from(params.mean.clone()),
            scale: Array1::from(params.scale.clone()),
        })
    }

    fn check_width(&self, actual: usize) -> DnaResult<()> {
        if actual != self.n_features() {
            return Err(DnaError::FeatureMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }
}
