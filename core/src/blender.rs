//! Risk blender: picks the model or the rules as the final score.
//!
//! RULE: Only a genuine model prediction (`PredictionMethod::Model`) with
//! confidence strictly above the configured minimum may override the rules.
//! Default and error predictions always fall back to the rule score.

use crate::{
    config::{BlenderConfig, RiskConfig, RiskLevelCutoffs},
    regressor::{Prediction, PredictionMethod},
    rule_scorer::RuleScore,
    types::{FactorBreakdown, RiskFactor, RiskLevel},
};
use serde::{Deserialize, Serialize};

/// Crisis horizon: 21 days shortened by one day per 5 points of risk.
const CRISIS_HORIZON_DAYS: u32 = 21;
const CRISIS_DAYS_PER_POINT: f64 = 0.2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    Model,
    Rules,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskResult {
    pub score:        u8,
    pub level:        RiskLevel,
    pub factors:      FactorBreakdown,
    pub method:       ScoringMethod,
    pub confidence:   f64,
    pub rule_score:   u8,
    pub samples_used: usize,
}

impl RiskResult {
    /// Estimated days until crisis: max(1, 21 - trunc(score × 0.2)).
    pub fn days_to_crisis(&self) -> u32 {
        let shortened = (f64::from(self.score) * CRISIS_DAYS_PER_POINT) as u32;
        CRISIS_HORIZON_DAYS.saturating_sub(shortened).max(1)
    }
}

pub struct RiskBlender {
    config:  BlenderConfig,
    cutoffs: RiskLevelCutoffs,
}

impl RiskBlender {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            config:  config.blender,
            cutoffs: config.risk_levels,
        }
    }

    pub fn blend(&self, prediction: &Prediction, rules: &RuleScore) -> RiskResult {
        let use_model = prediction.method == PredictionMethod::Model
            && prediction.confidence > self.config.min_model_confidence;

        let (score, method, factors) = if use_model {
            let factors = rescale(&rules.factors, prediction.score, rules.score);
            (prediction.score, ScoringMethod::Model, factors)
        } else {
            (rules.score, ScoringMethod::Rules, rules.factors)
        };

        log::debug!(
            "Blended score {score} via {method:?} (model {} @ {:.2}, rules {})",
            prediction.score,
            prediction.confidence,
            rules.score
        );

        RiskResult {
            score,
            level: self.cutoffs.level_for(score),
            factors,
            method,
            confidence: prediction.confidence,
            rule_score: rules.score,
            samples_used: prediction.samples_used,
        }
    }
}

/// Stretch rule factors toward the model score for display. Each factor stays
/// within its cap; a zero rule score leaves the factors as they were.
fn rescale(factors: &FactorBreakdown, final_score: u8, rule_score: u8) -> FactorBreakdown {
    if rule_score == 0 {
        return *factors;
    }
    let ratio = f64::from(final_score) / f64::from(rule_score);
    let mut scaled = FactorBreakdown::default();
    for (factor, value) in factors.iter() {
        let v = (f64::from(value) * ratio) as u32;
        scaled.set(factor, v.min(RiskFactor::cap(factor)));
    }
    scaled
}
