use serde_json::{Value, json};

use crate::common::entity::ToolType;

/// Build the JSON body for a vendor alert-state mutation.
///
/// Code-scanning and dependabot alerts know "open" and "dismissed"; a
/// dismissal carries `dismissed_reason`. Secret-scanning alerts close via
/// "resolved" (on either DISMISS or RESOLVE) and carry the reason as
/// `resolution`. Open/confirm requests never attach a reason.
pub fn state_request_body(
    tool_type: ToolType,
    requested_state: &str,
    mapped_reason: Option<&str>,
) -> Value {
    match tool_type {
        ToolType::CodeScanning | ToolType::Dependabot => {
            if requested_state.eq_ignore_ascii_case("DISMISS") {
                json!({
                    "state": "dismissed",
                    "dismissed_reason": mapped_reason.unwrap_or("other"),
                })
            } else {
                json!({ "state": "open" })
            }
        }
        ToolType::SecretScanning => {
            if requested_state.eq_ignore_ascii_case("DISMISS")
                || requested_state.eq_ignore_ascii_case("RESOLVE")
            {
                let resolution = match mapped_reason {
                    Some(r) if !r.trim().is_empty() => r,
                    _ => "wont_fix",
                };
                json!({
                    "state": "resolved",
                    "resolution": resolution,
                })
            } else {
                json!({ "state": "open" })
            }
        }
    }
}
