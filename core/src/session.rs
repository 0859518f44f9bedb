//! Mutable per-session activity for the selected customer.
//!
//! RULES:
//!   - Every mutator validates first and mutates second: a rejected input
//!     leaves the session untouched.
//!   - `reconcile()` restores `balance == sum(deposits) - wagered` and
//!     `wagered <= sum(deposits)` by correction, never by error.

use crate::{
    config::ValidationLimits,
    error::{DnaError, DnaResult},
    profile::CustomerProfile,
    types::{Amount, CustomerName, Location},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Balances closer than this are treated as equal.
const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionActivity {
    pub session_id:       Uuid,
    pub customer:         CustomerName,
    pub deposits:         Vec<Amount>,
    pub wagers:           Vec<Amount>,
    pub wagered:          Amount,
    pub balance:          Amount,
    pub session_minutes:  u32,
    pub location:         Location,
    /// Live support contacts during this session.
    pub support_calls:    u32,
    pub location_history: Vec<Location>,
}

impl SessionActivity {
    /// Fresh session: zero balance, baseline session length, at home.
    pub fn new(profile: &CustomerProfile) -> Self {
        Self {
            session_id:       Uuid::new_v4(),
            customer:         profile.name.clone(),
            deposits:         Vec::new(),
            wagers:           Vec::new(),
            wagered:          0.0,
            balance:          0.0,
            session_minutes:  profile.avg_session_minutes,
            location:         Location::Home,
            support_calls:    0,
            location_history: Vec::new(),
        }
    }

    pub fn total_deposits(&self) -> Amount {
        self.deposits.iter().sum()
    }

    pub fn largest_deposit(&self) -> Amount {
        self.deposits.iter().copied().fold(0.0, f64::max)
    }

    /// Visits to casinos and betting shops recorded in the history.
    pub fn high_risk_visits(&self) -> usize {
        self.location_history
            .iter()
            .filter(|l| l.is_high_risk_venue())
            .count()
    }

    // ── Mutators ───────────────────────────────────────────────

    pub fn deposit(&mut self, amount: Amount, limits: &ValidationLimits) -> DnaResult<()> {
        check_positive(amount)?;
        check_ceiling("deposit", amount, limits.max_deposit)?;
        self.deposits.push(amount);
        self.balance += amount;
        Ok(())
    }

    /// Wagers draw down the balance; a wager larger than the balance is refused.
    pub fn wager(&mut self, amount: Amount, limits: &ValidationLimits) -> DnaResult<()> {
        check_positive(amount)?;
        check_ceiling("wager", amount, limits.max_wager)?;
        if amount > self.balance {
            return Err(DnaError::InsufficientBalance {
                available: self.balance.max(0.0),
                requested: amount,
            });
        }
        self.wagers.push(amount);
        self.wagered += amount;
        self.balance -= amount;
        Ok(())
    }

    pub fn set_session_minutes(&mut self, minutes: u32, limits: &ValidationLimits) -> DnaResult<()> {
        check_ceiling(
            "session time",
            f64::from(minutes),
            f64::from(limits.max_session_minutes),
        )?;
        self.session_minutes = minutes;
        Ok(())
    }

    /// Move to `location`. Returns the previous location when it changed.
    /// Each change is appended to the history, oldest entries dropped first.
    pub fn move_to(&mut self, location: Location, limits: &ValidationLimits) -> Option<Location> {
        if location == self.location {
            return None;
        }
        let previous = self.location;
        self.location = location;
        self.location_history.push(location);
        let max = limits.max_location_history;
        if self.location_history.len() > max {
            let excess = self.location_history.len() - max;
            self.location_history.drain(..excess);
        }
        Some(previous)
    }

    pub fn contact_support(&mut self, limits: &ValidationLimits) -> DnaResult<u32> {
        if self.support_calls >= limits.max_support_calls {
            return Err(DnaError::SupportLimitReached {
                max: limits.max_support_calls,
            });
        }
        self.support_calls += 1;
        Ok(self.support_calls)
    }

    /// Back to a fresh session for the same customer, keeping the session id.
    pub fn reset(&mut self, profile: &CustomerProfile) {
        let session_id = self.session_id;
        *self = Self::new(profile);
        self.session_id = session_id;
    }

    // ── Invariants ─────────────────────────────────────────────

    /// Clamp `wagered` to total deposits and recompute the balance.
    /// Returns true when anything had to be corrected.
    pub fn reconcile(&mut self) -> bool {
        let total = self.total_deposits();
        let mut corrected = false;

        if self.wagered > total {
            log::debug!(
                "Session {}: wagered {:.2} exceeds deposits {:.2}, clamping",
                self.session_id, self.wagered, total
            );
            self.wagered = total;
            corrected = true;
        }

        let expected = total - self.wagered;
        if (self.balance - expected).abs() > BALANCE_TOLERANCE {
            log::debug!(
                "Session {}: balance {:.2} corrected to {:.2}",
                self.session_id, self.balance, expected
            );
            corrected = true;
        }
        // Snap to the exact value even inside the tolerance.
        self.balance = expected;

        corrected
    }
}

fn check_positive(amount: Amount) -> DnaResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(DnaError::NonPositiveAmount(amount))
    }
}

fn check_ceiling(field: &'static str, value: f64, max: f64) -> DnaResult<()> {
    if value > max {
        return Err(DnaError::InputOutOfBounds { field, value, max });
    }
    Ok(())
}
