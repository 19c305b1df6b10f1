use serde::{Deserialize, Serialize};

use crate::common::entity::{FindingId, Severity, ToolType};

/// Canonical lifecycle state of a finding, independent of vendor vocabulary.
///
/// `Open` is the default and the fallback for any unrecognized input —
/// normalization never fails, it degrades to `Open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalState {
    #[default]
    Open,
    FalsePositive,
    Suppressed,
    Fixed,
    Confirm,
}

impl CanonicalState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::FalsePositive => "FALSE_POSITIVE",
            Self::Suppressed => "SUPPRESSED",
            Self::Fixed => "FIXED",
            Self::Confirm => "CONFIRM",
        }
    }

    /// Case-insensitive parse of a canonical state name. Returns `None` for
    /// anything outside the closed 5-value set.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let candidates = [
            Self::Open,
            Self::FalsePositive,
            Self::Suppressed,
            Self::Fixed,
            Self::Confirm,
        ];
        candidates
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
    }

    /// A "done" state triggers the auto-transition of any linked ticket.
    /// Every state except `Open` is done.
    pub fn is_done(self) -> bool {
        self != Self::Open
    }
}

impl std::fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical finding record as stored in the index.
///
/// The engine reads it and partially updates `state` and `ticket_id`, but
/// never deletes it. `alert_number` is kept as the string the index stores
/// (keyword field); callers parse it when a numeric alert number is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: FindingId,
    pub alert_number: String,
    pub tool_type: ToolType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: CanonicalState,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}
