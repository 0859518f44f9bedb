//! Customer profiles and the fixed registry they are selected from.
//!
//! Profiles are static inputs. The engine never creates or mutates them.

use crate::{
    error::{DnaError, DnaResult},
    types::{Amount, CustomerName, Profession, RiskCategory, WorkStress},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub name:                CustomerName,
    pub age:                 u32,
    pub annual_income:       Amount,
    pub profession:          Profession,
    pub risk_category:       RiskCategory,
    pub monthly_limit:       Amount,
    /// Baseline session length in minutes.
    pub avg_session_minutes: u32,
    /// Historical support contacts before this session.
    pub support_contacts:    u32,
    /// 0–10.
    pub financial_stress:    u32,
    pub work_stress:         WorkStress,
    pub emotional_state:     String,
    #[serde(default)]
    pub gambling_trigger:    String,
    #[serde(default)]
    pub spending_pattern:    String,
}

impl CustomerProfile {
    pub fn monthly_income(&self) -> Amount {
        self.annual_income / 12.0
    }

    /// Monthly limit, falling back to monthly income when no limit is set.
    pub fn effective_monthly_limit(&self) -> Amount {
        if self.monthly_limit > 0.0 {
            self.monthly_limit
        } else {
            self.monthly_income()
        }
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct ProfilesFile {
    profiles: Vec<CustomerProfile>,
}

/// Named profiles in a stable display order.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<CustomerProfile>,
}

impl ProfileRegistry {
    pub fn new(profiles: Vec<CustomerProfile>) -> Self {
        Self { profiles }
    }

    /// Load from data/profiles/customer_profiles.json.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/profiles/customer_profiles.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ProfilesFile = serde_json::from_str(&content)?;
        if file.profiles.is_empty() {
            anyhow::bail!("{path} contains no profiles");
        }
        Ok(Self::new(file.profiles))
    }

    /// The three demo customers.
    pub fn builtin() -> Self {
        Self::new(vec![
            CustomerProfile {
                name: "Sarah Martinez - Primary School Teacher".into(),
                age: 34,
                annual_income: 28_000.0,
                profession: Profession::Teacher,
                risk_category: RiskCategory::High,
                monthly_limit: 500.0,
                avg_session_minutes: 180,
                support_contacts: 6,
                financial_stress: 8,
                work_stress: WorkStress::High,
                emotional_state: "Stressed".into(),
                gambling_trigger: "Work pressure & low income".into(),
                spending_pattern: "Small frequent deposits during pay week".into(),
            },
            CustomerProfile {
                name: "Michael Thompson - Marketing Executive".into(),
                age: 42,
                annual_income: 65_000.0,
                profession: Profession::Executive,
                risk_category: RiskCategory::Medium,
                monthly_limit: 1_200.0,
                avg_session_minutes: 120,
                support_contacts: 2,
                financial_stress: 4,
                work_stress: WorkStress::Medium,
                emotional_state: "Controlled".into(),
                gambling_trigger: "Social gambling & entertainment".into(),
                spending_pattern: "Moderate planned gambling budget".into(),
            },
            CustomerProfile {
                name: "David Chen - Restaurant Owner".into(),
                age: 29,
                annual_income: 42_000.0,
                profession: Profession::BusinessOwner,
                risk_category: RiskCategory::Critical,
                monthly_limit: 2_000.0,
                avg_session_minutes: 300,
                support_contacts: 12,
                financial_stress: 10,
                work_stress: WorkStress::VeryHigh,
                emotional_state: "Desperate".into(),
                gambling_trigger: "Business losses & cash flow issues".into(),
                spending_pattern: "Large desperate bets to recover losses".into(),
            },
        ])
    }

    pub fn get(&self, name: &str) -> DnaResult<&CustomerProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DnaError::UnknownProfile { name: name.to_string() })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomerProfile> {
        self.profiles.iter()
    }

    pub fn first(&self) -> Option<&CustomerProfile> {
        self.profiles.first()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
