//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable profile key in the registry ("Sarah Martinez - Primary School Teacher").
pub type CustomerName = String;

/// Money amounts in the session, in whole-currency units.
pub type Amount = f64;

// ── Profile enums ────────────────────────────────────────────────────────────

/// Assigned risk band of a customer profile. Drives the rule multipliers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Profession {
    Teacher,
    Executive,
    #[serde(rename = "Business Owner")]
    BusinessOwner,
    #[serde(other)]
    Other,
}

impl Profession {
    /// Numeric stress/income risk used as a model feature.
    pub fn risk_weight(self) -> f64 {
        match self {
            Self::Teacher       => 7.0,
            Self::Executive     => 4.0,
            Self::BusinessOwner => 9.0,
            Self::Other         => 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkStress {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Extreme,
}

impl WorkStress {
    pub fn level(self) -> f64 {
        match self {
            Self::Low      => 2.0,
            Self::Medium   => 5.0,
            Self::High     => 7.0,
            Self::VeryHigh => 9.0,
            Self::Extreme  => 10.0,
        }
    }
}

// ── Session enums ────────────────────────────────────────────────────────────

/// Where the customer is gambling from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    Home,
    Work,
    Casino,
    #[serde(rename = "Betting Shop")]
    BettingShop,
    Public,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Home,
        Location::Work,
        Location::Casino,
        Location::BettingShop,
        Location::Public,
    ];

    /// Casino and betting shop are the high-risk venues.
    pub fn is_high_risk_venue(self) -> bool {
        matches!(self, Self::Casino | Self::BettingShop)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Home        => "Home",
            Self::Work        => "Work",
            Self::Casino      => "Casino",
            Self::BettingShop => "Betting Shop",
            Self::Public      => "Public",
        };
        f.write_str(label)
    }
}

// ── Risk output enums ────────────────────────────────────────────────────────

/// Overall risk level. Ordered LOW < MEDIUM < HIGH < CRITICAL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low      => "LOW",
            Self::Medium   => "MEDIUM",
            Self::High     => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// The five independently scored risk dimensions, in evaluation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskFactor {
    Deposit,
    Spending,
    Session,
    Location,
    Support,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::Deposit,
        RiskFactor::Spending,
        RiskFactor::Session,
        RiskFactor::Location,
        RiskFactor::Support,
    ];

    /// Maximum points this factor can contribute.
    pub fn cap(self) -> u32 {
        match self {
            Self::Deposit | Self::Spending => 25,
            Self::Session                  => 20,
            Self::Location | Self::Support => 15,
        }
    }
}

/// Points per factor. Each field is kept within its factor's cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FactorBreakdown {
    pub deposit:  u32,
    pub spending: u32,
    pub session:  u32,
    pub location: u32,
    pub support:  u32,
}

impl FactorBreakdown {
    pub fn get(&self, factor: RiskFactor) -> u32 {
        match factor {
            RiskFactor::Deposit  => self.deposit,
            RiskFactor::Spending => self.spending,
            RiskFactor::Session  => self.session,
            RiskFactor::Location => self.location,
            RiskFactor::Support  => self.support,
        }
    }

    pub fn set(&mut self, factor: RiskFactor, value: u32) {
        let slot = match factor {
            RiskFactor::Deposit  => &mut self.deposit,
            RiskFactor::Spending => &mut self.spending,
            RiskFactor::Session  => &mut self.session,
            RiskFactor::Location => &mut self.location,
            RiskFactor::Support  => &mut self.support,
        };
        *slot = value;
    }

    pub fn total(&self) -> u32 {
        RiskFactor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Factor values in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskFactor, u32)> + '_ {
        RiskFactor::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}
