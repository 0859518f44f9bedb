//! Session events: what a command changed, plus monitoring alerts.
//!
//! RULE: Commands report their effects only through events.
//! Callers render or log events; they never inspect session internals to
//! find out what happened.

use crate::types::{Amount, Location};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event a session command can emit.
/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    // ── State changes ──────────────────────────────
    DepositRecorded {
        session_id: Uuid,
        amount:     Amount,
        balance:    Amount,
    },
    WagerPlaced {
        session_id: Uuid,
        amount:     Amount,
        balance:    Amount,
    },
    SessionTimeSet {
        session_id: Uuid,
        minutes:    u32,
    },
    LocationChanged {
        session_id: Uuid,
        from:       Location,
        to:         Location,
    },
    SupportContacted {
        session_id: Uuid,
        live_calls: u32,
    },
    SessionReset {
        session_id: Uuid,
        customer:   String,
    },

    // ── Monitoring ─────────────────────────────────
    Alert(MonitoringAlert),
}

impl SessionEvent {
    pub fn as_alert(&self) -> Option<&MonitoringAlert> {
        match self {
            SessionEvent::Alert(alert) => Some(alert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertRule {
    LargeDeposit,
    DepositEscalation,
    LargeWager,
    LimitBreach,
    WagerFrequency,
    HighRiskVenue,
    WorkplaceGambling,
    SupportFrequency,
    SupportVolume,
    SupportLimitReached,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringAlert {
    pub rule:     AlertRule,
    pub severity: AlertSeverity,
    pub message:  String,
}

impl MonitoringAlert {
    pub fn new(rule: AlertRule, severity: AlertSeverity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
        }
    }
}

impl From<MonitoringAlert> for SessionEvent {
    fn from(alert: MonitoringAlert) -> Self {
        SessionEvent::Alert(alert)
    }
}
