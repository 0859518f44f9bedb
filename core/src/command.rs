use crate::types::{Amount, Location};
use serde::{Deserialize, Serialize};

/// All user-issued session commands.
/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SessionCommand {
    // ── Money ─────────────────────────────────────
    Deposit { amount: Amount },
    Wager { amount: Amount },

    // ── Activity ──────────────────────────────────
    SetSessionTime { minutes: u32 },
    SetLocation { location: Location },
    ContactSupport,

    // ── Lifecycle ─────────────────────────────────
    Reset,
}

impl SessionCommand {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Deposit { .. }        => "deposit",
            SessionCommand::Wager { .. }          => "wager",
            SessionCommand::SetSessionTime { .. } => "set_session_time",
            SessionCommand::SetLocation { .. }    => "set_location",
            SessionCommand::ContactSupport        => "contact_support",
            SessionCommand::Reset                 => "reset",
        }
    }
}
