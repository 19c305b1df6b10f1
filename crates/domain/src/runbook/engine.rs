use crate::finding::entity::Finding;
use crate::runbook::config::RunbookConfig;

/// Summaries and descriptions copied onto synthesized tickets are capped at
/// this many characters.
pub const TICKET_TEXT_MAX: usize = 200;

/// A derived action for one (config, finding) pair, ready to be turned into
/// a synthesized job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunbookAction {
    /// Re-enter the update-finding path with a vendor-facing action string
    /// ("DISMISS", "RESOLVE", "FALSE_POSITIVE" or "OPEN").
    UpdateFinding {
        vendor_action: String,
        reason: String,
    },
    /// Re-enter the create-ticket path with the finding's (truncated) text.
    CreateTicket {
        summary: String,
        description: String,
    },
}

/// Evaluate one runbook config against one finding.
///
/// Returns the actions to apply, in the fixed order update-then-create.
/// Returns nothing when the filter does not match. Each (config, finding)
/// pair is independent; callers apply the actions of every matching config
/// with no de-duplication across runs.
pub fn evaluate(config: &RunbookConfig, finding: &Finding) -> Vec<RunbookAction> {
    if !config.filter.matches(finding) {
        return Vec::new();
    }

    let mut actions = Vec::new();

    if let Some(update) = &config.actions.update_finding {
        let from_matches = match update.from.as_deref() {
            None => true,
            Some(from) if from.trim().is_empty() => true,
            Some(from) => from.eq_ignore_ascii_case(finding.state.as_str()),
        };
        if from_matches {
            actions.push(RunbookAction::UpdateFinding {
                vendor_action: derive_vendor_action(update.to.as_deref()).to_string(),
                reason: "other".to_string(),
            });
        }
    }

    if config.actions.create_ticket {
        actions.push(RunbookAction::CreateTicket {
            summary: truncate(&finding.title, TICKET_TEXT_MAX),
            description: truncate(&finding.description, TICKET_TEXT_MAX),
        });
    }

    actions
}

/// Map a runbook target state to the vendor-facing action string understood
/// by the alert client.
pub fn derive_vendor_action(to_state: Option<&str>) -> &'static str {
    let Some(to_state) = to_state else {
        return "OPEN";
    };
    match to_state.to_ascii_uppercase().as_str() {
        "SUPPRESSED" => "DISMISS",
        "FALSE_POSITIVE" => "FALSE_POSITIVE",
        "DISMISS" => "DISMISS",
        "RESOLVE" => "RESOLVE",
        _ => "OPEN",
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::entity::{FindingId, Severity, ToolType};
    use crate::finding::entity::CanonicalState;
    use crate::runbook::config::{FindingFilter, RunbookActions, StateTransition};

    fn make_finding(state: CanonicalState) -> Finding {
        Finding {
            id: FindingId("f-9".to_string()),
            alert_number: "42".to_string(),
            tool_type: ToolType::Dependabot,
            title: "vulnerable transitive dependency".to_string(),
            description: "bump to >= 4.17.21".to_string(),
            state,
            severity: Severity::High,
            ticket_id: None,
        }
    }

    fn make_config(filter: FindingFilter, actions: RunbookActions) -> RunbookConfig {
        RunbookConfig {
            runbook_id: "rb-1".to_string(),
            trigger: "NEW_SCAN".to_string(),
            filter,
            actions,
        }
    }

    #[test]
    fn non_matching_filter_yields_nothing() {
        let config = make_config(
            FindingFilter {
                state: Some("FIXED".to_string()),
                severity: None,
            },
            RunbookActions {
                update_finding: Some(StateTransition {
                    from: None,
                    to: Some("SUPPRESSED".to_string()),
                }),
                create_ticket: true,
            },
        );
        assert!(evaluate(&config, &make_finding(CanonicalState::Open)).is_empty());
    }

    #[test]
    fn update_action_derives_dismiss_for_suppressed() {
        let config = make_config(
            FindingFilter {
                state: Some("open".to_string()),
                severity: None,
            },
            RunbookActions {
                update_finding: Some(StateTransition {
                    from: Some("OPEN".to_string()),
                    to: Some("SUPPRESSED".to_string()),
                }),
                create_ticket: false,
            },
        );
        let actions = evaluate(&config, &make_finding(CanonicalState::Open));
        assert_eq!(
            actions,
            vec![RunbookAction::UpdateFinding {
                vendor_action: "DISMISS".to_string(),
                reason: "other".to_string(),
            }]
        );
    }

    #[test]
    fn from_state_gates_the_update() {
        let config = make_config(
            FindingFilter::default(),
            RunbookActions {
                update_finding: Some(StateTransition {
                    from: Some("OPEN".to_string()),
                    to: Some("SUPPRESSED".to_string()),
                }),
                create_ticket: false,
            },
        );
        // Finding already suppressed: from=OPEN does not match, no action.
        assert!(evaluate(&config, &make_finding(CanonicalState::Suppressed)).is_empty());
    }

    #[test]
    fn blank_from_applies_to_any_state() {
        let config = make_config(
            FindingFilter::default(),
            RunbookActions {
                update_finding: Some(StateTransition {
                    from: Some("".to_string()),
                    to: Some("RESOLVE".to_string()),
                }),
                create_ticket: false,
            },
        );
        let actions = evaluate(&config, &make_finding(CanonicalState::Confirm));
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn create_ticket_truncates_text() {
        let mut finding = make_finding(CanonicalState::Open);
        finding.title = "t".repeat(500);
        finding.description = "d".repeat(150);

        let config = make_config(
            FindingFilter::default(),
            RunbookActions {
                update_finding: None,
                create_ticket: true,
            },
        );
        let actions = evaluate(&config, &finding);
        match &actions[0] {
            RunbookAction::CreateTicket {
                summary,
                description,
            } => {
                assert_eq!(summary.len(), TICKET_TEXT_MAX);
                assert_eq!(description.len(), 150);
            }
            other => panic!("expected CreateTicket, got {other:?}"),
        }
    }

    #[test]
    fn update_comes_before_create() {
        let config = make_config(
            FindingFilter::default(),
            RunbookActions {
                update_finding: Some(StateTransition {
                    from: None,
                    to: Some("SUPPRESSED".to_string()),
                }),
                create_ticket: true,
            },
        );
        let actions = evaluate(&config, &make_finding(CanonicalState::Open));
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], RunbookAction::UpdateFinding { .. }));
        assert!(matches!(actions[1], RunbookAction::CreateTicket { .. }));
    }

    #[test]
    fn derive_vendor_action_table() {
        assert_eq!(derive_vendor_action(Some("SUPPRESSED")), "DISMISS");
        assert_eq!(derive_vendor_action(Some("suppressed")), "DISMISS");
        assert_eq!(derive_vendor_action(Some("FALSE_POSITIVE")), "FALSE_POSITIVE");
        assert_eq!(derive_vendor_action(Some("DISMISS")), "DISMISS");
        assert_eq!(derive_vendor_action(Some("RESOLVE")), "RESOLVE");
        assert_eq!(derive_vendor_action(Some("FIXED")), "OPEN");
        assert_eq!(derive_vendor_action(None), "OPEN");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(300);
        assert_eq!(truncate(&s, 200).chars().count(), 200);
    }
}
