//! Intervention recommender: one suggested action per elevated factor.
//!
//! A factor at or above its low threshold produces exactly one
//! intervention. The list is ordered CRITICAL → HIGH → MEDIUM; factors of
//! equal urgency keep evaluation order.

use crate::{
    blender::RiskResult,
    config::{InterventionThresholds, RiskConfig, UrgencyBasis},
    types::{RiskFactor, RiskLevel},
};
use serde::{Deserialize, Serialize};

/// Declared most urgent first, so sorting ascending puts CRITICAL on top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    DepositControls,
    SpendManagement,
    SessionManagement,
    LocationMonitoring,
    EnhancedSupport,
}

impl InterventionKind {
    pub fn for_factor(factor: RiskFactor) -> Self {
        match factor {
            RiskFactor::Deposit  => Self::DepositControls,
            RiskFactor::Spending => Self::SpendManagement,
            RiskFactor::Session  => Self::SessionManagement,
            RiskFactor::Location => Self::LocationMonitoring,
            RiskFactor::Support  => Self::EnhancedSupport,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DepositControls    => "Deposit Controls",
            Self::SpendManagement    => "Spend Management",
            Self::SessionManagement  => "Session Management",
            Self::LocationMonitoring => "Location Monitoring",
            Self::EnhancedSupport    => "Enhanced Support",
        }
    }

    /// Fixed text per (kind, urgency).
    pub fn action(self, urgency: Urgency) -> &'static str {
        use InterventionKind::*;
        use Urgency::*;
        match (self, urgency) {
            (DepositControls, Critical)    => "Immediate deposit intervention - Critical risk detected",
            (DepositControls, High)        => "Deposit monitoring - High risk pattern identified",
            (DepositControls, Medium)      => "Deposit tracking - Preventive monitoring",
            (SpendManagement, Critical)    => "Immediate spend intervention - Critical wagering detected",
            (SpendManagement, High)        => "Spend limits - High risk wagering pattern",
            (SpendManagement, Medium)      => "Spend monitoring - Preventive measures",
            (SessionManagement, Critical)  => "Session controls - Enforce mandatory break",
            (SessionManagement, High)      => "Session controls - Reality check reminders",
            (SessionManagement, Medium)    => "Session controls - Time awareness prompts",
            (LocationMonitoring, Critical) => "Location alerts - Critical risk venue activity",
            (LocationMonitoring, High)     => "Location alerts - High risk venue activity",
            (LocationMonitoring, Medium)   => "Location alerts - Venue activity tracking",
            (EnhancedSupport, Critical)    => "Immediate crisis intervention - Critical support needed",
            (EnhancedSupport, High)        => "Priority counselor contact - High risk support",
            (EnhancedSupport, Medium)      => "Enhanced support monitoring - Preventive care",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intervention {
    pub kind:    InterventionKind,
    pub factor:  RiskFactor,
    pub urgency: Urgency,
    pub action:  String,
}

pub struct InterventionRecommender {
    thresholds: InterventionThresholds,
    basis:      UrgencyBasis,
}

impl InterventionRecommender {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            thresholds: config.intervention_thresholds.clone(),
            basis:      config.urgency_basis,
        }
    }

    pub fn with_basis(mut self, basis: UrgencyBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn recommend(&self, result: &RiskResult) -> Vec<Intervention> {
        let mut interventions: Vec<Intervention> = result
            .factors
            .iter()
            .filter_map(|(factor, value)| {
                let thresholds = self.thresholds.for_factor(factor);
                if value < thresholds.low {
                    return None;
                }
                let urgency = self.urgency(factor, value, result.level);
                let kind = InterventionKind::for_factor(factor);
                Some(Intervention {
                    kind,
                    factor,
                    urgency,
                    action: kind.action(urgency).to_string(),
                })
            })
            .collect();

        // sort_by_key is stable.
        interventions.sort_by_key(|i| i.urgency);
        interventions
    }

    fn urgency(&self, factor: RiskFactor, value: u32, level: RiskLevel) -> Urgency {
        let thresholds = self.thresholds.for_factor(factor);
        match self.basis {
            UrgencyBasis::FactorMagnitude => match thresholds.high {
                Some(high) if value >= high => Urgency::Critical,
                _ if value >= thresholds.medium => Urgency::High,
                _ => Urgency::Medium,
            },
            UrgencyBasis::OverallLevel => {
                let by_level = match level {
                    RiskLevel::Critical => Urgency::Critical,
                    RiskLevel::High     => Urgency::High,
                    _                   => Urgency::Medium,
                };
                // Factors without a high threshold never reach CRITICAL.
                if thresholds.high.is_none() && by_level == Urgency::Critical {
                    Urgency::High
                } else {
                    by_level
                }
            }
        }
    }
}
