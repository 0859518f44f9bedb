//! Externalized constants: thresholds, level cutoffs, validation ceilings,
//! profile multipliers and model parameters.
//!
//! RULE: The engine reads these values; it never writes or validates them.
//! `RiskConfig::default()` carries the canonical table. `RiskConfig::load`
//! reads the same shape from `data/risk/risk_config.json`.

use crate::{
    rng::DEFAULT_BOOTSTRAP_SEED,
    types::{RiskCategory, RiskFactor, RiskLevel},
};
use serde::{Deserialize, Serialize};

// ── Intervention thresholds ──────────────────────────────────────────────────

/// Low/medium/high points for one factor. `high` is absent for factors whose
/// interventions never escalate to CRITICAL on their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactorThresholds {
    pub low:    u32,
    pub medium: u32,
    #[serde(default)]
    pub high:   Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterventionThresholds {
    pub deposit:  FactorThresholds,
    pub spending: FactorThresholds,
    pub session:  FactorThresholds,
    pub location: FactorThresholds,
    pub support:  FactorThresholds,
}

impl InterventionThresholds {
    pub fn for_factor(&self, factor: RiskFactor) -> FactorThresholds {
        match factor {
            RiskFactor::Deposit  => self.deposit,
            RiskFactor::Spending => self.spending,
            RiskFactor::Session  => self.session,
            RiskFactor::Location => self.location,
            RiskFactor::Support  => self.support,
        }
    }
}

/// What drives intervention urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBasis {
    /// The factor's own points against its medium/high thresholds.
    #[default]
    FactorMagnitude,
    /// The overall risk level of the assessment.
    OverallLevel,
}

// ── Risk levels ──────────────────────────────────────────────────────────────

/// Minimum final score for each level. Anything below `medium` is LOW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskLevelCutoffs {
    pub critical: u8,
    pub high:     u8,
    pub medium:   u8,
}

impl RiskLevelCutoffs {
    pub fn level_for(&self, score: u8) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

// ── Input validation ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationLimits {
    pub max_deposit:          f64,
    pub max_wager:            f64,
    pub max_session_minutes:  u32,
    pub max_support_calls:    u32,
    pub max_location_history: usize,
}

// ── Profile multipliers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProfileMultiplier {
    pub deposit:  f64,
    pub spending: f64,
    pub support:  f64,
    pub overall:  f64,
}

impl ProfileMultiplier {
    pub const NEUTRAL: ProfileMultiplier = ProfileMultiplier {
        deposit:  1.0,
        spending: 1.0,
        support:  1.0,
        overall:  1.0,
    };
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileMultipliers {
    pub critical: ProfileMultiplier,
    pub high:     ProfileMultiplier,
    pub medium:   ProfileMultiplier,
    #[serde(default = "neutral_multiplier")]
    pub low:      ProfileMultiplier,
}

fn neutral_multiplier() -> ProfileMultiplier {
    ProfileMultiplier::NEUTRAL
}

impl ProfileMultipliers {
    pub fn for_category(&self, category: RiskCategory) -> ProfileMultiplier {
        match category {
            RiskCategory::Critical => self.critical,
            RiskCategory::High     => self.high,
            RiskCategory::Medium   => self.medium,
            RiskCategory::Low      => self.low,
        }
    }
}

// ── Regressor / blender ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressorConfig {
    /// L2 penalty of the ridge fit.
    pub alpha:                f64,
    pub max_samples:          usize,
    pub min_training_samples: usize,
    /// Retrain after every N accumulated samples.
    pub retrain_every:        u64,
    pub bootstrap_seed:       u64,
    pub min_score:            f64,
    pub max_score:            f64,
    pub base_confidence:      f64,
    pub max_confidence:       f64,
    /// Buffer length at which confidence gains +1.0 (0.7 + len / 200).
    pub confidence_divisor:   f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlenderConfig {
    /// The model score wins only when its confidence is strictly above this.
    pub min_model_confidence: f64,
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    pub intervention_thresholds: InterventionThresholds,
    #[serde(default)]
    pub urgency_basis:           UrgencyBasis,
    pub risk_levels:             RiskLevelCutoffs,
    pub validation:              ValidationLimits,
    pub profile_multipliers:     ProfileMultipliers,
    pub regressor:               RegressorConfig,
    pub blender:                 BlenderConfig,
}

impl RiskConfig {
    /// Load from the data/ directory.
    /// In tests, use RiskConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/risk/risk_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: RiskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid risk config {path}: {e}"))?;
        log::debug!("Loaded risk config from {path}");
        Ok(config)
    }

    pub fn level_for(&self, score: u8) -> RiskLevel {
        self.risk_levels.level_for(score)
    }
}

impl Default for RiskConfig {
    /// The canonical table: CRITICAL ≥ 80, HIGH ≥ 60, MEDIUM ≥ 40.
    fn default() -> Self {
        Self {
            intervention_thresholds: InterventionThresholds {
                deposit:  FactorThresholds { low: 8,  medium: 15, high: Some(22) },
                spending: FactorThresholds { low: 8,  medium: 15, high: Some(22) },
                session:  FactorThresholds { low: 10, medium: 15, high: Some(18) },
                location: FactorThresholds { low: 10, medium: 15, high: None },
                support:  FactorThresholds { low: 8,  medium: 12, high: Some(15) },
            },
            urgency_basis: UrgencyBasis::FactorMagnitude,
            risk_levels: RiskLevelCutoffs {
                critical: 80,
                high:     60,
                medium:   40,
            },
            validation: ValidationLimits {
                max_deposit:          50_000.0,
                max_wager:            25_000.0,
                max_session_minutes:  1_440,
                max_support_calls:    20,
                max_location_history: 50,
            },
            profile_multipliers: ProfileMultipliers {
                critical: ProfileMultiplier { deposit: 1.4, spending: 1.3, support: 1.2, overall: 1.2 },
                high:     ProfileMultiplier { deposit: 1.2, spending: 1.1, support: 1.0, overall: 1.1 },
                medium:   ProfileMultiplier::NEUTRAL,
                low:      ProfileMultiplier::NEUTRAL,
            },
            regressor: RegressorConfig {
                alpha:                0.1,
                max_samples:          100,
                min_training_samples: 10,
                retrain_every:        5,
                bootstrap_seed:       DEFAULT_BOOTSTRAP_SEED,
                min_score:            15.0,
                max_score:            95.0,
                base_confidence:      0.7,
                max_confidence:       0.95,
                confidence_divisor:   200.0,
            },
            blender: BlenderConfig {
                min_model_confidence: 0.7,
            },
        }
    }
}
