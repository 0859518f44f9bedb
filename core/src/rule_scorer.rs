//! Rule-based risk scorer: five capped factors, profile multipliers, level.
//!
//! RULE: Pure. Same profile and session in, same score out. The scorer reads
//! the session and never corrects it; `reconcile()` runs before scoring.

use crate::{
    config::{ProfileMultipliers, RiskConfig, RiskLevelCutoffs},
    profile::CustomerProfile,
    session::SessionActivity,
    types::{FactorBreakdown, Location, RiskCategory, RiskFactor, RiskLevel},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleScore {
    /// 0–100.
    pub score:   u8,
    pub level:   RiskLevel,
    pub factors: FactorBreakdown,
}

pub struct RuleScorer {
    multipliers: ProfileMultipliers,
    cutoffs:     RiskLevelCutoffs,
}

impl RuleScorer {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            multipliers: config.profile_multipliers.clone(),
            cutoffs:     config.risk_levels,
        }
    }

    pub fn score(&self, profile: &CustomerProfile, session: &SessionActivity) -> RuleScore {
        let factors = self.factors(profile, session);
        let overall = self.multipliers.for_category(profile.risk_category).overall;
        let score = scale(factors.total(), overall).min(100) as u8;

        RuleScore {
            score,
            level: self.cutoffs.level_for(score),
            factors,
        }
    }

    /// Per-factor points, each within its cap.
    pub fn factors(&self, profile: &CustomerProfile, session: &SessionActivity) -> FactorBreakdown {
        let multiplier = self.multipliers.for_category(profile.risk_category);
        let monthly_income = profile.monthly_income();

        let mut factors = FactorBreakdown::default();
        factors.set(
            RiskFactor::Deposit,
            deposit_points(session, monthly_income, multiplier.deposit),
        );
        factors.set(
            RiskFactor::Spending,
            spending_points(profile, session, monthly_income, multiplier.spending),
        );
        factors.set(RiskFactor::Session, session_points(profile, session));
        factors.set(RiskFactor::Location, location_points(profile, session));
        factors.set(
            RiskFactor::Support,
            support_points(profile, session, multiplier.support),
        );

        for factor in RiskFactor::ALL {
            factors.set(factor, factors.get(factor).min(factor.cap()));
        }
        factors
    }
}

// ── Factors ──────────────────────────────────────────────────────────────────

fn deposit_points(session: &SessionActivity, monthly_income: f64, multiplier: f64) -> u32 {
    if session.deposits.is_empty() {
        return 0;
    }
    let ratio = per_income(session.total_deposits(), monthly_income);
    let base = match ratio {
        r if r > 3.0 => 25,
        r if r > 2.0 => 22,
        r if r > 1.5 => 18,
        r if r > 1.0 => 15,
        r if r > 0.5 => 12,
        r if r > 0.2 => 10,
        _            => 5,
    };
    let count_bonus = match session.deposits.len() {
        n if n > 8 => 8,
        n if n > 5 => 5,
        n if n > 3 => 3,
        _          => 0,
    };

    let mut points = scale(base + count_bonus, multiplier);
    if session.largest_deposit() > monthly_income {
        points += 5;
    }
    points.min(RiskFactor::Deposit.cap())
}

fn spending_points(
    profile: &CustomerProfile,
    session: &SessionActivity,
    monthly_income: f64,
    multiplier: f64,
) -> u32 {
    if session.wagered <= 0.0 {
        return 0;
    }
    let ratio = per_income(session.wagered, monthly_income);
    let base = match ratio {
        r if r > 2.0 => 25,
        r if r > 1.5 => 22,
        r if r > 1.0 => 18,
        r if r > 0.5 => 15,
        r if r > 0.2 => 10,
        _            => 5,
    };

    let limit = profile.effective_monthly_limit();
    let limit_ratio = if limit > 0.0 { session.wagered / limit } else { 0.0 };
    let limit_bonus = match limit_ratio {
        r if r > 1.0 => 8,
        r if r > 0.8 => 5,
        _            => 0,
    };
    let frequency_bonus = match session.wagers.len() {
        n if n > 10 => 5,
        n if n > 5  => 3,
        _           => 0,
    };

    scale(base + limit_bonus + frequency_bonus, multiplier).min(RiskFactor::Spending.cap())
}

fn session_points(profile: &CustomerProfile, session: &SessionActivity) -> u32 {
    let ratio = if profile.avg_session_minutes > 0 {
        f64::from(session.session_minutes) / f64::from(profile.avg_session_minutes)
    } else {
        1.0
    };
    match ratio {
        r if r > 2.0 => 20,
        r if r > 1.5 => 15,
        _            => 8,
    }
}

fn location_points(profile: &CustomerProfile, session: &SessionActivity) -> u32 {
    let mut points = match session.location {
        Location::Casino | Location::BettingShop => 15,
        Location::Work                           => 10,
        Location::Public                         => 8,
        Location::Home                           => 5,
    };
    points += match session.high_risk_visits() {
        n if n > 3 => 5,
        n if n > 1 => 3,
        _          => 0,
    };
    if session.location.is_high_risk_venue() {
        match profile.risk_category {
            RiskCategory::Critical => points = 15,
            RiskCategory::High     => points += 2,
            _ => {}
        }
    }
    points.min(RiskFactor::Location.cap())
}

fn support_points(profile: &CustomerProfile, session: &SessionActivity, multiplier: f64) -> u32 {
    let total = profile.support_contacts.saturating_add(session.support_calls);
    let mut points = match total {
        n if n > 15 => 15,
        n if n > 10 => 12,
        n if n > 5  => 10,
        n if n > 2  => 8,
        _           => 5,
    };
    match session.support_calls {
        n if n > 5 => points = 15,
        n if n > 3 => points += 3,
        n if n > 1 => points += 2,
        _ => {}
    }
    points += profile.financial_stress / 3;

    scale(points, multiplier).min(RiskFactor::Support.cap())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn per_income(amount: f64, monthly_income: f64) -> f64 {
    if monthly_income > 0.0 {
        amount / monthly_income
    } else {
        0.0
    }
}

/// Multiply and truncate toward zero.
fn scale(points: u32, multiplier: f64) -> u32 {
    (f64::from(points) * multiplier).max(0.0) as u32
}
