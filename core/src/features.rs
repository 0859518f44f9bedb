//! Risk feature extraction.
//!
//! Builds the fixed-order numeric vector the regressor trains and predicts
//! on. Computed fresh from profile + session on every evaluation.

use crate::{
    error::{DnaError, DnaResult},
    profile::CustomerProfile,
    session::SessionActivity,
    types::Location,
};
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 19;

/// Column order of every feature vector. NEVER reorder: persisted models
/// and training buffers depend on it.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "income",
    "financial_stress",
    "total_deposits",
    "total_wagered",
    "session_time",
    "support_calls",
    "deposit_count",
    "wager_count",
    "location_risk",
    "profession_risk",
    "work_stress_level",
    "deposit_to_income_ratio",
    "wager_to_income_ratio",
    "wager_to_deposit_ratio",
    "session_intensity",
    "gambling_frequency",
    "support_escalation",
    "risk_amplifier",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values, checking the dimension.
    pub fn from_values(values: Vec<f64>) -> DnaResult<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(DnaError::FeatureMismatch {
                expected: FEATURE_COUNT,
                actual:   values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn extract(profile: &CustomerProfile, session: &SessionActivity) -> Self {
        let monthly_income = profile.monthly_income();
        let total_deposits = session.total_deposits();
        let total_wagered = session.wagered;
        let deposit_count = session.deposits.len() as f64;
        let wager_count = session.wagers.len() as f64;
        let session_time = f64::from(session.session_minutes);
        let financial_stress = f64::from(profile.financial_stress);

        let per_income = |amount: f64| {
            if monthly_income > 0.0 {
                amount / monthly_income
            } else {
                0.0
            }
        };

        let wager_to_deposit = if total_deposits > 0.0 {
            total_wagered / total_deposits
        } else {
            0.0
        };

        let session_intensity = if profile.avg_session_minutes > 0 {
            session_time / f64::from(profile.avg_session_minutes)
        } else {
            1.0
        };

        let support_escalation =
            f64::from(session.support_calls) / f64::from(profile.support_contacts.max(1));

        let stress_multiplier = 1.0 + financial_stress / 20.0;
        let risk_amplifier = location_multiplier(session.location) * stress_multiplier;

        let values = vec![
            f64::from(profile.age),
            profile.annual_income,
            financial_stress,
            total_deposits,
            total_wagered,
            session_time,
            f64::from(profile.support_contacts.saturating_add(session.support_calls)),
            deposit_count,
            wager_count,
            location_risk(session.location),
            profile.profession.risk_weight(),
            profile.work_stress.level(),
            per_income(total_deposits),
            per_income(total_wagered),
            wager_to_deposit,
            session_intensity,
            deposit_count + wager_count,
            support_escalation,
            risk_amplifier,
        ];

        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values.get(i).copied())
    }
}

/// Tiered venue risk as seen by the model (5 / 10 / 15).
pub fn location_risk(location: Location) -> f64 {
    match location {
        Location::Casino | Location::BettingShop => 15.0,
        Location::Work                           => 10.0,
        _                                        => 5.0,
    }
}

fn location_multiplier(location: Location) -> f64 {
    match location {
        Location::Casino | Location::BettingShop => 1.5,
        Location::Work                           => 1.2,
        _                                        => 1.0,
    }
}
