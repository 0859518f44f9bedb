//! Snapshot serialization: full regressor state to/from JSON.
//!
//! A snapshot captures everything needed to resume predicting and
//! learning without re-running the bootstrap: the training buffer,
//! the fitted scaler and model, and the sample counter that drives
//! the retraining cadence.

use crate::{regressor::TrainingSample, ridge::RidgeParams, scaler::ScalerParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressorSnapshot {
    /// Oldest first.
    pub samples:      Vec<TrainingSample>,
    pub scaler:       Option<ScalerParams>,
    pub model:        Option<RidgeParams>,
    /// Samples ever accumulated, including evicted ones.
    pub samples_seen: u64,
    pub trained_at:   Option<DateTime<Utc>>,
}

impl RegressorSnapshot {
    pub fn is_trained(&self) -> bool {
        self.scaler.is_some() && self.model.is_some()
    }
}
