use crate::common::entity::ToolType;

/// Map a tenant-supplied free-text dismiss reason to the vendor's enumerated
/// reason code.
///
/// Only mutation requests that close an alert carry a reason: anything other
/// than "DISMISS" or "RESOLVE" (case-insensitive) returns `None`. A required
/// but absent or blank reason is substituted with "other" before mapping, so
/// every close request ends up with a valid vendor code.
pub fn map_reason(
    tool_type: Option<ToolType>,
    requested_reason: Option<&str>,
    requested_state: &str,
) -> Option<String> {
    let state = requested_state.to_ascii_uppercase();
    if state != "DISMISS" && state != "RESOLVE" {
        return None;
    }

    let reason = match requested_reason {
        Some(r) if !r.trim().is_empty() => r.to_ascii_lowercase(),
        _ => "other".to_string(),
    };

    let mapped = match tool_type {
        Some(ToolType::Dependabot) => match reason.as_str() {
            "fix_started" => "fix_started",
            "inaccurate" => "inaccurate",
            "no_bandwidth" => "no_bandwidth",
            "not_used" => "not_used",
            "tolerable_risk" => "tolerable_risk",
            _ => "not_used",
        },
        Some(ToolType::CodeScanning) => match reason.as_str() {
            "false positive" | "false_positive" => "false positive",
            "won't fix" | "wont_fix" => "won't fix",
            "used in tests" | "used_in_tests" => "used in tests",
            _ => "won't fix",
        },
        Some(ToolType::SecretScanning) => match reason.as_str() {
            "false_positive" => "false_positive",
            "wont_fix" | "won't_fix" => "wont_fix",
            "revoked" => "revoked",
            "used_in_tests" => "used_in_tests",
            _ => "wont_fix",
        },
        // Safe generic default for a tool we do not recognize.
        None => "false_positive",
    };

    Some(mapped.to_string())
}
