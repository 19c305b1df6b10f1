use crate::common::entity::ToolType;
use crate::finding::entity::CanonicalState;

/// Normalize a raw vendor alert state into the canonical 5-value model.
///
/// Total and deterministic: every input maps to exactly one state, with
/// `Open` as the fallback. Matching is case-insensitive and treats
/// underscores as spaces, so "False_Positive" and "false positive" are the
/// same word.
///
/// A dismissed alert is classified by its dismiss reason: reasons naming a
/// false positive ("false positive", "false_positive", "inaccurate") map to
/// `FalsePositive`, everything else collapses to `Suppressed`. The mapping is
/// intentionally lossy — downstream automation keys only on the canonical
/// state, not the original vendor text.
pub fn normalize(
    raw_state: &str,
    tool_type: Option<ToolType>,
    dismiss_reason: Option<&str>,
) -> CanonicalState {
    let folded = raw_state.trim().to_ascii_lowercase().replace('_', " ");

    match folded.as_str() {
        "" => CanonicalState::Open,
        "open" | "new" => CanonicalState::Open,
        "fixed" | "resolved" => CanonicalState::Fixed,
        "confirm" | "acknowledged" => CanonicalState::Confirm,
        "false positive" => CanonicalState::FalsePositive,
        "dismiss" | "dismissed" => classify_dismissal(tool_type, dismiss_reason),
        _ => CanonicalState::Open,
    }
}

/// For a supported tool, a dismissal is a false positive when the reason says
/// so; otherwise it is a suppression. Unsupported tools always suppress.
fn classify_dismissal(
    tool_type: Option<ToolType>,
    dismiss_reason: Option<&str>,
) -> CanonicalState {
    if tool_type.is_none() {
        return CanonicalState::Suppressed;
    }

    let reason = dismiss_reason.unwrap_or("").to_ascii_lowercase();
    if reason.contains("false positive")
        || reason.contains("false_positive")
        || reason.contains("inaccurate")
    {
        CanonicalState::FalsePositive
    } else {
        CanonicalState::Suppressed
    }
}
