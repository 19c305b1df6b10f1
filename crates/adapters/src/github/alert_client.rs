use std::future::Future;
use std::pin::Pin;

use domain::alert::request::state_request_body;
use domain::common::entity::ToolType;
use ports::secondary::vendor_alert::VendorAlertApi;
use reqwest::StatusCode;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Vendor alert client for the GitHub-style alert APIs.
///
/// One PATCH per tool type, path parameterized by owner/repo/alert number.
/// A 409 means the alert already sits in the target closed state; repeated
/// delivery of the same update must not surface as an error, so conflicts
/// count as success.
pub struct GithubAlertClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubAlertClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Point the client at a different API base (GHE deployments, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn alert_url(&self, owner: &str, repo: &str, tool_type: ToolType, alert_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/{}/alerts/{}",
            self.base_url,
            owner,
            repo,
            tool_type.api_segment(),
            alert_number
        )
    }
}

impl Default for GithubAlertClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a response status means the alert now sits in the requested
/// state. 2xx is a fresh application; 409 means it was already there —
/// repeated delivery of the same update is success, not failure.
fn status_applied(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::CONFLICT
}

impl VendorAlertApi for GithubAlertClient {
    fn set_alert_state<'a>(
        &'a self,
        credential: &'a str,
        owner: &'a str,
        repo: &'a str,
        tool_type: ToolType,
        alert_number: u64,
        requested_state: &'a str,
        mapped_reason: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let url = self.alert_url(owner, repo, tool_type, alert_number);
            let body = state_request_body(tool_type, requested_state, mapped_reason);

            let response = self
                .http
                .patch(&url)
                .bearer_auth(credential)
                .header("Accept", "application/vnd.github+json")
                .json(&body)
                .send()
                .await;

            match response {
                Ok(resp) if status_applied(resp.status()) => {
                    if resp.status() == StatusCode::CONFLICT {
                        tracing::debug!(
                            tool = %tool_type,
                            alert_number,
                            "alert already in target state, treating conflict as success"
                        );
                    }
                    true
                }
                Ok(resp) => {
                    tracing::warn!(
                        tool = %tool_type,
                        alert_number,
                        status = %resp.status(),
                        "vendor alert update failed"
                    );
                    false
                }
                Err(e) => {
                    tracing::warn!(
                        tool = %tool_type,
                        alert_number,
                        error = %e,
                        "vendor alert update request error"
                    );
                    false
                }
            }
        })
    }
}
