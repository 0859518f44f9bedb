//! Activity monitoring: alerts raised as the session changes.
//!
//! Alerts are advisory. They never block a command; validation
//! happens in `session.rs` before any alert is considered.

use crate::{
    event::{AlertRule, AlertSeverity, MonitoringAlert},
    profile::CustomerProfile,
    session::SessionActivity,
    types::{Amount, Location, RiskCategory},
};

// ── Constants ────────────────────────────────────────────────────────────────

/// Single deposit, as a fraction of monthly income, that alarms per category.
const CRITICAL_LARGE_DEPOSIT_SHARE: f64 = 0.5;
const HIGH_LARGE_DEPOSIT_SHARE: f64 = 0.7;
/// Total deposits above this many monthly incomes escalate.
const DEPOSIT_ESCALATION_MULTIPLE: f64 = 2.0;

const CRITICAL_LARGE_WAGER_SHARE: f64 = 0.3;
const LARGE_WAGER_SHARE: f64 = 0.4;
const WAGER_FREQUENCY_ALERT: usize = 8;

const LIVE_SUPPORT_ALERT: u32 = 3;
const TOTAL_SUPPORT_ALERT: u32 = 10;

// ── Rules ────────────────────────────────────────────────────────────────────

/// Alerts for a deposit of `amount` that has already been applied to `session`.
pub fn deposit_alerts(
    profile: &CustomerProfile,
    session: &SessionActivity,
    amount: Amount,
) -> Vec<MonitoringAlert> {
    let mut alerts = Vec::new();
    let monthly_income = profile.monthly_income();

    if profile.risk_category == RiskCategory::Critical
        && amount > monthly_income * CRITICAL_LARGE_DEPOSIT_SHARE
    {
        alerts.push(MonitoringAlert::new(
            AlertRule::LargeDeposit,
            AlertSeverity::Critical,
            format!("Large deposit £{amount:.0} for critical-risk customer"),
        ));
    } else if profile.risk_category == RiskCategory::High
        && amount > monthly_income * HIGH_LARGE_DEPOSIT_SHARE
    {
        alerts.push(MonitoringAlert::new(
            AlertRule::LargeDeposit,
            AlertSeverity::Warning,
            format!("Large deposit £{amount:.0} for high-risk customer"),
        ));
    } else if amount > monthly_income {
        alerts.push(MonitoringAlert::new(
            AlertRule::LargeDeposit,
            AlertSeverity::Warning,
            format!("Deposit £{amount:.0} exceeds monthly income"),
        ));
    }

    let total = session.total_deposits();
    if total > monthly_income * DEPOSIT_ESCALATION_MULTIPLE {
        alerts.push(MonitoringAlert::new(
            AlertRule::DepositEscalation,
            AlertSeverity::Critical,
            format!("Total deposits £{total:.0} exceed 2x monthly income"),
        ));
    }

    alerts
}

/// Alerts for a wager of `amount` that has already been applied to `session`.
pub fn wager_alerts(
    profile: &CustomerProfile,
    session: &SessionActivity,
    amount: Amount,
) -> Vec<MonitoringAlert> {
    let mut alerts = Vec::new();
    let monthly_income = profile.monthly_income();
    let limit = profile.effective_monthly_limit();

    if profile.risk_category == RiskCategory::Critical
        && amount > monthly_income * CRITICAL_LARGE_WAGER_SHARE
    {
        alerts.push(MonitoringAlert::new(
            AlertRule::LargeWager,
            AlertSeverity::Critical,
            format!("Large wager £{amount:.0} for critical-risk customer"),
        ));
    } else if session.wagered > limit {
        alerts.push(MonitoringAlert::new(
            AlertRule::LimitBreach,
            AlertSeverity::Critical,
            format!(
                "Total wagered £{:.0} exceeds monthly limit £{limit:.0}",
                session.wagered
            ),
        ));
    } else if amount > monthly_income * LARGE_WAGER_SHARE {
        alerts.push(MonitoringAlert::new(
            AlertRule::LargeWager,
            AlertSeverity::Warning,
            format!("Large wager £{amount:.0}"),
        ));
    }

    let count = session.wagers.len();
    if count > WAGER_FREQUENCY_ALERT {
        alerts.push(MonitoringAlert::new(
            AlertRule::WagerFrequency,
            AlertSeverity::Warning,
            format!("{count} wagers placed this session"),
        ));
    }

    alerts
}

pub fn location_alerts(profile: &CustomerProfile, location: Location) -> Vec<MonitoringAlert> {
    if location.is_high_risk_venue() {
        let severity = if profile.risk_category == RiskCategory::Critical {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        vec![MonitoringAlert::new(
            AlertRule::HighRiskVenue,
            severity,
            format!("High-risk location: {location}"),
        )]
    } else if location == Location::Work {
        vec![MonitoringAlert::new(
            AlertRule::WorkplaceGambling,
            AlertSeverity::Info,
            "Gambling at work detected",
        )]
    } else {
        Vec::new()
    }
}

/// Alerts after a live support contact. `max_calls` is the session ceiling.
pub fn support_alerts(
    profile: &CustomerProfile,
    session: &SessionActivity,
    max_calls: u32,
) -> Vec<MonitoringAlert> {
    let mut alerts = Vec::new();
    let live = session.support_calls;
    let total = profile.support_contacts.saturating_add(live);

    if live > LIVE_SUPPORT_ALERT {
        alerts.push(MonitoringAlert::new(
            AlertRule::SupportFrequency,
            AlertSeverity::Critical,
            format!("High support frequency: {live} calls this session"),
        ));
    } else if total > TOTAL_SUPPORT_ALERT {
        alerts.push(MonitoringAlert::new(
            AlertRule::SupportVolume,
            AlertSeverity::Warning,
            format!("Total support contacts: {total}"),
        ));
    }

    if live >= max_calls {
        alerts.push(MonitoringAlert::new(
            AlertRule::SupportLimitReached,
            AlertSeverity::Warning,
            "Maximum support contacts reached for this session",
        ));
    }

    alerts
}
