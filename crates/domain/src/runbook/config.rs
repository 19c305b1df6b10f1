use serde::{Deserialize, Serialize};

use crate::finding::entity::Finding;
use crate::runbook::error::RunbookError;

/// Filter predicate of a runbook config.
///
/// Both fields are optional equality checks (case-insensitive) against the
/// finding's canonical state and severity names. An absent or blank field
/// matches everything, so the empty filter matches every finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingFilter {
    pub state: Option<String>,
    pub severity: Option<String>,
}

impl FindingFilter {
    pub fn matches(&self, finding: &Finding) -> bool {
        if let Some(want) = &self.state
            && !want.trim().is_empty()
            && !want.eq_ignore_ascii_case(finding.state.as_str())
        {
            return false;
        }
        if let Some(want) = &self.severity
            && !want.trim().is_empty()
            && !want.eq_ignore_ascii_case(finding.severity.as_str())
        {
            return false;
        }
        true
    }
}

/// The `update_finding` action: move a finding from one canonical state to
/// another. A blank `from` applies regardless of the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTransition {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Action list of a runbook config, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunbookActions {
    pub update_finding: Option<StateTransition>,
    pub create_ticket: bool,
}

/// Typed runbook configuration.
///
/// The raw `filters_json` / `actions_json` blobs are parsed exactly once,
/// when the config is loaded — never per finding. A blob that does not parse
/// marks the whole config malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookConfig {
    pub runbook_id: String,
    pub trigger: String,
    #[serde(default)]
    pub filter: FindingFilter,
    #[serde(default)]
    pub actions: RunbookActions,
}

impl RunbookConfig {
    /// Parse a config from its stored parts. Blank blobs mean "no filter" /
    /// "no actions".
    pub fn from_json_parts(
        runbook_id: &str,
        trigger: &str,
        filters_json: &str,
        actions_json: &str,
    ) -> Result<Self, RunbookError> {
        let malformed = |message: String| RunbookError::MalformedConfig {
            runbook_id: runbook_id.to_string(),
            message,
        };

        let filter = if filters_json.trim().is_empty() {
            FindingFilter::default()
        } else {
            serde_json::from_str(filters_json).map_err(|e| malformed(format!("filters: {e}")))?
        };

        let actions = if actions_json.trim().is_empty() {
            RunbookActions::default()
        } else {
            serde_json::from_str(actions_json).map_err(|e| malformed(format!("actions: {e}")))?
        };

        Ok(Self {
            runbook_id: runbook_id.to_string(),
            trigger: trigger.to_string(),
            filter,
            actions,
        })
    }

    pub fn is_new_scan_trigger(&self) -> bool {
        self.trigger.eq_ignore_ascii_case("NEW_SCAN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::entity::{FindingId, Severity, ToolType};
    use crate::finding::entity::CanonicalState;

    fn make_finding(state: CanonicalState, severity: Severity) -> Finding {
        Finding {
            id: FindingId("f-1".to_string()),
            alert_number: "7".to_string(),
            tool_type: ToolType::CodeScanning,
            title: "SQL injection in search".to_string(),
            description: "user input reaches the query builder".to_string(),
            state,
            severity,
            ticket_id: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = FindingFilter::default();
        assert!(filter.matches(&make_finding(CanonicalState::Open, Severity::High)));
        assert!(filter.matches(&make_finding(CanonicalState::Fixed, Severity::Low)));
    }

    #[test]
    fn state_filter_is_case_insensitive() {
        let filter = FindingFilter {
            state: Some("open".to_string()),
            severity: None,
        };
        assert!(filter.matches(&make_finding(CanonicalState::Open, Severity::High)));
        assert!(!filter.matches(&make_finding(CanonicalState::Fixed, Severity::High)));
    }

    #[test]
    fn severity_filter_applies() {
        let filter = FindingFilter {
            state: None,
            severity: Some("high".to_string()),
        };
        assert!(filter.matches(&make_finding(CanonicalState::Open, Severity::High)));
        assert!(!filter.matches(&make_finding(CanonicalState::Open, Severity::Low)));
    }

    #[test]
    fn both_filters_must_match() {
        let filter = FindingFilter {
            state: Some("OPEN".to_string()),
            severity: Some("HIGH".to_string()),
        };
        assert!(filter.matches(&make_finding(CanonicalState::Open, Severity::High)));
        assert!(!filter.matches(&make_finding(CanonicalState::Open, Severity::Medium)));
        assert!(!filter.matches(&make_finding(CanonicalState::Suppressed, Severity::High)));
    }

    #[test]
    fn blank_filter_value_matches_all() {
        let filter = FindingFilter {
            state: Some("  ".to_string()),
            severity: None,
        };
        assert!(filter.matches(&make_finding(CanonicalState::Confirm, Severity::Low)));
    }

    #[test]
    fn from_json_parts_parses_blobs_once() {
        let config = RunbookConfig::from_json_parts(
            "rb-1",
            "NEW_SCAN",
            r#"{"state": "OPEN", "severity": "HIGH"}"#,
            r#"{"update_finding": {"from": "OPEN", "to": "SUPPRESSED"}, "create_ticket": true}"#,
        )
        .unwrap();

        assert!(config.is_new_scan_trigger());
        assert_eq!(config.filter.state.as_deref(), Some("OPEN"));
        let update = config.actions.update_finding.unwrap();
        assert_eq!(update.from.as_deref(), Some("OPEN"));
        assert_eq!(update.to.as_deref(), Some("SUPPRESSED"));
        assert!(config.actions.create_ticket);
    }

    #[test]
    fn blank_blobs_default() {
        let config = RunbookConfig::from_json_parts("rb-2", "NEW_SCAN", "", "  ").unwrap();
        assert_eq!(config.filter, FindingFilter::default());
        assert!(config.actions.update_finding.is_none());
        assert!(!config.actions.create_ticket);
    }

    #[test]
    fn malformed_blob_is_rejected() {
        let err = RunbookConfig::from_json_parts("rb-3", "NEW_SCAN", "{not json", "{}")
            .unwrap_err();
        assert!(err.to_string().contains("rb-3"), "got: {err}");
    }

    #[test]
    fn trigger_match_is_case_insensitive() {
        let config = RunbookConfig::from_json_parts("rb-4", "new_scan", "", "").unwrap();
        assert!(config.is_new_scan_trigger());
        let config = RunbookConfig::from_json_parts("rb-5", "SCHEDULED", "", "").unwrap();
        assert!(!config.is_new_scan_trigger());
    }

    #[test]
    fn unknown_filter_keys_are_tolerated() {
        // Tenant-authored blobs may carry extra keys; they are ignored, not
        // treated as malformed.
        let config = RunbookConfig::from_json_parts(
            "rb-6",
            "NEW_SCAN",
            r#"{"state": "OPEN", "notes": "triage sweep"}"#,
            "{}",
        );
        assert!(config.is_ok());
    }
}
