use std::future::Future;
use std::pin::Pin;

use domain::common::entity::ToolType;

/// Per-vendor-tool adapter that mutates a single alert's state.
///
/// Implementations must tolerate already-applied mutations: a remote
/// conflict (the alert is already in the target closed state) is success,
/// not failure, so redelivery of the same update never surfaces as an error.
pub trait VendorAlertApi: Send + Sync {
    /// Set the remote alert state.
    ///
    /// Returns `true` on success or an idempotent conflict; `false` on any
    /// other remote failure (auth, not-found, 5xx). Never panics and never
    /// returns an error — the caller records the failure without crashing
    /// the job.
    fn set_alert_state<'a>(
        &'a self,
        credential: &'a str,
        owner: &'a str,
        repo: &'a str,
        tool_type: ToolType,
        alert_number: u64,
        requested_state: &'a str,
        mapped_reason: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}
