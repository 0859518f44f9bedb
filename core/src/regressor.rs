//! Online risk regressor: ridge regression retrained on a rolling buffer.
//!
//! This component:
//!   1. Bootstraps 50 synthetic, pseudo-labelled samples across three risk bands
//!   2. Predicts a 15–95 risk score with a confidence that grows with the buffer
//!   3. Appends one sample per evaluation (FIFO, capped at 100)
//!   4. Refits scaler + model inline on every 5th accumulated sample
//!
//! KNOWN LIMITATION: without ground truth, each new sample is labelled with
//! the model's own prior prediction. Training on those pseudo-labels only
//! reinforces what the model already believes. Nothing here corrects for
//! that drift, and no ground truth is ever invented to hide it.

use crate::{
    config::RegressorConfig,
    error::{DnaError, DnaResult},
    features::{FeatureVector, FEATURE_COUNT},
    profile::CustomerProfile,
    ridge::RidgeModel,
    rng::SeededRng,
    scaler::StandardScaler,
    session::SessionActivity,
    snapshot::RegressorSnapshot,
};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Score and confidence returned whenever the model cannot be used.
pub const DEFAULT_SCORE: u8 = 50;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    /// A genuine prediction from the fitted model.
    Model,
    /// Not enough training data yet.
    Default,
    /// The model failed at prediction time.
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub score:        u8,
    pub confidence:   f64,
    pub method:       PredictionMethod,
    pub samples_used: usize,
}

impl Prediction {
    fn fallback(method: PredictionMethod, samples_used: usize) -> Self {
        Self {
            score: DEFAULT_SCORE,
            confidence: DEFAULT_CONFIDENCE,
            method,
            samples_used,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingSample {
    pub features:    FeatureVector,
    pub target:      f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct FittedModel {
    scaler: StandardScaler,
    ridge:  RidgeModel,
}

// ── Regressor ────────────────────────────────────────────────────────────────

pub struct OnlineRiskRegressor {
    config:       RegressorConfig,
    buffer:       VecDeque<TrainingSample>,
    model:        Option<FittedModel>,
    samples_seen: u64,
    trained_at:   Option<DateTime<Utc>>,
}

impl OnlineRiskRegressor {
    /// A regressor with an empty buffer and no model. Predicts the default.
    pub fn empty(config: RegressorConfig) -> Self {
        Self {
            config,
            buffer: VecDeque::new(),
            model: None,
            samples_seen: 0,
            trained_at: None,
        }
    }

    /// A regressor seeded with the synthetic bootstrap set and trained on it.
    pub fn new(config: RegressorConfig) -> DnaResult<Self> {
        let mut regressor = Self::empty(config);
        regressor.bootstrap()?;
        Ok(regressor)
    }

    /// Rebuild from a snapshot. Samples must match the current feature layout.
    /// A stored model of the wrong width is kept; predictions then report
    /// `PredictionMethod::Error` until the next retrain replaces it.
    pub fn restore(config: RegressorConfig, snapshot: RegressorSnapshot) -> DnaResult<Self> {
        for sample in &snapshot.samples {
            if sample.features.len() != FEATURE_COUNT {
                return Err(DnaError::FeatureMismatch {
                    expected: FEATURE_COUNT,
                    actual:   sample.features.len(),
                });
            }
        }

        let model = match (&snapshot.scaler, &snapshot.model) {
            (Some(scaler), Some(ridge)) => Some(FittedModel {
                scaler: StandardScaler::from_params(scaler)?,
                ridge:  RidgeModel::from_params(ridge),
            }),
            _ => None,
        };
        if let Some(m) = &model {
            if m.ridge.n_features() != FEATURE_COUNT {
                log::warn!(
                    "Restored model has {} coefficients, expected {FEATURE_COUNT}",
                    m.ridge.n_features()
                );
            }
        }

        let mut buffer: VecDeque<TrainingSample> = snapshot.samples.into();
        while buffer.len() > config.max_samples {
            buffer.pop_front();
        }

        Ok(Self {
            config,
            buffer,
            model,
            samples_seen: snapshot.samples_seen,
            trained_at: snapshot.trained_at,
        })
    }

    /// Replace the buffer with the synthetic bootstrap set and train on it.
    pub fn bootstrap(&mut self) -> DnaResult<()> {
        self.reset();
        let samples = bootstrap_samples(self.config.bootstrap_seed)?;
        self.samples_seen = samples.len() as u64;
        self.buffer.extend(samples);
        while self.buffer.len() > self.config.max_samples {
            self.buffer.pop_front();
        }
        self.train()?;
        log::info!(
            "Regressor bootstrapped with {} synthetic samples",
            self.buffer.len()
        );
        Ok(())
    }

    /// Drop every sample and the fitted model.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.model = None;
        self.samples_seen = 0;
        self.trained_at = None;
    }

    pub fn snapshot(&self) -> RegressorSnapshot {
        RegressorSnapshot {
            samples:      self.buffer.iter().cloned().collect(),
            scaler:       self.model.as_ref().map(|m| m.scaler.params()),
            model:        self.model.as_ref().map(|m| m.ridge.params()),
            samples_seen: self.samples_seen,
            trained_at:   self.trained_at,
        }
    }

    // ── Prediction ─────────────────────────────────────────────

    pub fn predict(&self, profile: &CustomerProfile, session: &SessionActivity) -> Prediction {
        self.predict_features(&FeatureVector::extract(profile, session))
    }

    pub fn predict_features(&self, features: &FeatureVector) -> Prediction {
        let samples_used = self.buffer.len();

        let model = match &self.model {
            Some(m) if samples_used >= self.config.min_training_samples => m,
            _ => return Prediction::fallback(PredictionMethod::Default, samples_used),
        };

        match Self::raw_score(model, features) {
            Ok(raw) => {
                let clamped = raw.clamp(self.config.min_score, self.config.max_score);
                Prediction {
                    score: clamped.floor() as u8,
                    confidence: self.confidence(),
                    method: PredictionMethod::Model,
                    samples_used,
                }
            }
            Err(e) => {
                log::warn!("Risk prediction failed, using default: {e}");
                Prediction::fallback(PredictionMethod::Error, samples_used)
            }
        }
    }

    fn raw_score(model: &FittedModel, features: &FeatureVector) -> DnaResult<f64> {
        let row = ArrayView1::from(features.values());
        let scaled = model.scaler.transform_row(row)?;
        let raw = model.ridge.predict_row(scaled.view())?;
        if !raw.is_finite() {
            return Err(DnaError::Model(format!("non-finite prediction {raw}")));
        }
        Ok(raw)
    }

    /// Grows with the buffer: base + len / divisor, capped.
    pub fn confidence(&self) -> f64 {
        let grown = self.config.base_confidence
            + self.buffer.len() as f64 / self.config.confidence_divisor;
        grown.min(self.config.max_confidence)
    }

    // ── Learning ───────────────────────────────────────────────

    /// Append a sample derived from this evaluation. Without a `label`, the
    /// model's own current prediction is used as a pseudo-label (50 before
    /// the model is trained). Returns true if the model was refit.
    pub fn add_sample(
        &mut self,
        profile: &CustomerProfile,
        session: &SessionActivity,
        label: Option<f64>,
    ) -> bool {
        let features = FeatureVector::extract(profile, session);
        let target = match label {
            Some(l) if l.is_finite() => l.clamp(0.0, 100.0),
            _ => self.pseudo_label(&features),
        };
        self.push_sample(TrainingSample {
            features,
            target,
            recorded_at: Utc::now(),
        })
    }

    fn pseudo_label(&self, features: &FeatureVector) -> f64 {
        if self.model.is_some() {
            f64::from(self.predict_features(features).score)
        } else {
            f64::from(DEFAULT_SCORE)
        }
    }

    /// Append a prepared sample, evicting the oldest past capacity, and
    /// retrain on every `retrain_every`-th accumulated sample.
    pub fn push_sample(&mut self, sample: TrainingSample) -> bool {
        self.buffer.push_back(sample);
        while self.buffer.len() > self.config.max_samples {
            self.buffer.pop_front();
        }
        self.samples_seen += 1;

        if self.config.retrain_every == 0 || self.samples_seen % self.config.retrain_every != 0 {
            return false;
        }
        match self.train() {
            Ok(trained) => trained,
            Err(e) => {
                log::warn!("Retraining failed, keeping previous model: {e}");
                false
            }
        }
    }

    /// Refit scaler and model on the whole buffer.
    /// Returns Ok(false) without touching the model when the buffer is too small.
    pub fn train(&mut self) -> DnaResult<bool> {
        let n = self.buffer.len();
        if n < self.config.min_training_samples {
            log::debug!("Skipping training: {n} samples < {}", self.config.min_training_samples);
            return Ok(false);
        }

        let mut x = Array2::<f64>::zeros((n, FEATURE_COUNT));
        let mut y = Array1::<f64>::zeros(n);
        for (i, sample) in self.buffer.iter().enumerate() {
            let values = sample.features.values();
            if values.len() != FEATURE_COUNT {
                return Err(DnaError::FeatureMismatch {
                    expected: FEATURE_COUNT,
                    actual:   values.len(),
                });
            }
            for (j, v) in values.iter().enumerate() {
                x[[i, j]] = *v;
            }
            y[i] = sample.target;
        }

        let scaler = StandardScaler::fit(&x)?;
        let x_scaled = scaler.transform(&x)?;
        let ridge = RidgeModel::fit(&x_scaled, &y, self.config.alpha)?;
        let r2 = ridge.r_squared(&x_scaled, &y).unwrap_or(f64::NAN);

        self.model = Some(FittedModel { scaler, ridge });
        self.trained_at = Some(Utc::now());
        log::info!(
            "Regressor retrained on {n} samples ({} seen), R² = {r2:.3}",
            self.samples_seen
        );
        Ok(true)
    }

    // ── Introspection ──────────────────────────────────────────

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrainingSample> {
        self.buffer.iter()
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.trained_at
    }

    pub fn config(&self) -> &RegressorConfig {
        &self.config
    }
}

// ── Bootstrap data ───────────────────────────────────────────────────────────

/// Sampling ranges for one synthetic risk band. Integer ranges are half-open.
struct Band {
    count:              usize,
    deposits:           (i64, i64),
    wager_floor:        i64,
    wager_ceiling:      i64,
    income:             (i64, i64),
    age:                (i64, i64),
    financial_stress:   (i64, i64),
    session_time:       (i64, i64),
    support_calls:      (i64, i64),
    deposit_count:      (i64, i64),
    wager_count:        (i64, i64),
    location_risk:      &'static [f64],
    profession_risk:    &'static [f64],
    work_stress:        (i64, i64),
    session_intensity:  (f64, f64),
    gambling_frequency: (i64, i64),
    support_escalation: (f64, f64),
    risk_amplifier:     (f64, f64),
    target:             (i64, i64),
}

const BANDS: [Band; 3] = [
    // Low: small amounts, stable behaviour.
    Band {
        count: 25,
        deposits: (20, 150),
        wager_floor: 10,
        wager_ceiling: 80,
        income: (40_000, 90_000),
        age: (25, 60),
        financial_stress: (1, 3),
        session_time: (30, 90),
        support_calls: (0, 1),
        deposit_count: (1, 2),
        wager_count: (1, 2),
        location_risk: &[5.0],
        profession_risk: &[4.0, 5.0],
        work_stress: (2, 4),
        session_intensity: (0.5, 1.2),
        gambling_frequency: (2, 4),
        support_escalation: (0.0, 0.5),
        risk_amplifier: (1.0, 1.2),
        target: (15, 30),
    },
    // Medium: moderate amounts, concerning ratios.
    Band {
        count: 15,
        deposits: (150, 500),
        wager_floor: 80,
        wager_ceiling: 400,
        income: (45_000, 80_000),
        age: (30, 55),
        financial_stress: (3, 6),
        session_time: (90, 180),
        support_calls: (1, 3),
        deposit_count: (2, 4),
        wager_count: (2, 5),
        location_risk: &[5.0, 10.0],
        profession_risk: &[4.0],
        work_stress: (4, 6),
        session_intensity: (1.0, 2.0),
        gambling_frequency: (4, 8),
        support_escalation: (0.3, 1.0),
        risk_amplifier: (1.2, 1.8),
        target: (35, 55),
    },
    // High: large amounts, several risk factors at once.
    Band {
        count: 10,
        deposits: (500, 1_500),
        wager_floor: 400,
        wager_ceiling: 1_400,
        income: (20_000, 45_000),
        age: (25, 45),
        financial_stress: (7, 10),
        session_time: (240, 480),
        support_calls: (5, 15),
        deposit_count: (4, 10),
        wager_count: (6, 15),
        location_risk: &[10.0, 15.0],
        profession_risk: &[7.0, 9.0],
        work_stress: (7, 10),
        session_intensity: (2.0, 4.0),
        gambling_frequency: (8, 20),
        support_escalation: (1.0, 3.0),
        risk_amplifier: (1.8, 3.0),
        target: (65, 90),
    },
];

/// The 50 synthetic samples (25 low, 15 medium, 10 high) used to seed the model.
/// Every sample wagers strictly less than it deposits.
pub fn bootstrap_samples(seed: u64) -> DnaResult<Vec<TrainingSample>> {
    let mut rng = SeededRng::new(seed).with_name("bootstrap");
    let recorded_at = Utc::now();
    let mut samples = Vec::with_capacity(BANDS.iter().map(|b| b.count).sum());

    for band in &BANDS {
        for _ in 0..band.count {
            let deposits = rng.int_in(band.deposits.0, band.deposits.1);
            let wagered = rng.int_in(band.wager_floor, band.wager_ceiling.min(deposits));
            let income = rng.int_in(band.income.0, band.income.1) as f64;
            let monthly_income = income / 12.0;
            let deposits = deposits as f64;
            let wagered = wagered as f64;

            let values = vec![
                rng.int_in(band.age.0, band.age.1) as f64,
                income,
                rng.int_in(band.financial_stress.0, band.financial_stress.1) as f64,
                deposits,
                wagered,
                rng.int_in(band.session_time.0, band.session_time.1) as f64,
                rng.int_in(band.support_calls.0, band.support_calls.1) as f64,
                rng.int_in(band.deposit_count.0, band.deposit_count.1) as f64,
                rng.int_in(band.wager_count.0, band.wager_count.1) as f64,
                rng.choose(band.location_risk),
                rng.choose(band.profession_risk),
                rng.int_in(band.work_stress.0, band.work_stress.1) as f64,
                deposits / monthly_income,
                wagered / monthly_income,
                wagered / deposits,
                rng.uniform(band.session_intensity.0, band.session_intensity.1),
                rng.int_in(band.gambling_frequency.0, band.gambling_frequency.1) as f64,
                rng.uniform(band.support_escalation.0, band.support_escalation.1),
                rng.uniform(band.risk_amplifier.0, band.risk_amplifier.1),
            ];
            let target = rng.int_in(band.target.0, band.target.1) as f64;

            samples.push(TrainingSample {
                features: FeatureVector::from_values(values)?,
                target,
                recorded_at,
            });
        }
    }

    Ok(samples)
}
