use std::future::Future;
use std::pin::Pin;

use domain::common::entity::{Tenant, TicketKey};
use domain::ticket::entity::Transition;
use domain::ticket::error::TicketError;
use ports::secondary::ticket_tracker::TicketTrackerApi;
use serde_json::{Value, json};

/// Ticket tracker client for Jira-style REST APIs.
///
/// Issues are created under the tenant's configured project with the fixed
/// issue type "Bug". Authentication is HTTP Basic with the tenant's tracker
/// user and API token.
pub struct JiraTicketClient {
    http: reqwest::Client,
}

impl JiraTicketClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn api_base(tenant: &Tenant) -> String {
        format!("https://{}/rest/api/2", tenant.tracker_site)
    }
}

impl Default for JiraTicketClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the tracker-assigned issue key out of a create-issue response.
fn extract_ticket_key(body: &Value) -> Option<TicketKey> {
    body.get("key")
        .and_then(Value::as_str)
        .map(|key| TicketKey(key.to_string()))
}

/// Parse the `transitions` array of a transitions response, preserving the
/// tracker's order. A missing or empty array means the ticket is terminal.
fn parse_transitions(body: &Value) -> Vec<Transition> {
    body.get("transitions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let id = entry.get("id")?.as_str()?.to_string();
                    let name = entry
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Some(Transition { id, name })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl TicketTrackerApi for JiraTicketClient {
    fn create_issue<'a>(
        &'a self,
        tenant: &'a Tenant,
        summary: &'a str,
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TicketKey, TicketError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/issue", Self::api_base(tenant));
            let body = json!({
                "fields": {
                    "project": { "key": tenant.project_key },
                    "summary": summary,
                    "description": description,
                    "issuetype": { "name": "Bug" },
                }
            });

            let response = self
                .http
                .post(&url)
                .basic_auth(&tenant.tracker_user, Some(&tenant.tracker_token))
                .json(&body)
                .send()
                .await
                .map_err(|e| TicketError::CreateFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TicketError::CreateFailed(format!(
                    "tracker returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| TicketError::CreateFailed(format!("unreadable response: {e}")))?;

            extract_ticket_key(&body).ok_or(TicketError::MissingKey)
        })
    }

    fn list_transitions<'a>(
        &'a self,
        tenant: &'a Tenant,
        ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Transition>, TicketError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/issue/{}/transitions?expand=transitions.fields",
                Self::api_base(tenant),
                ticket_key
            );

            let response = self
                .http
                .get(&url)
                .basic_auth(&tenant.tracker_user, Some(&tenant.tracker_token))
                .send()
                .await
                .map_err(|e| TicketError::TransitionsFetchFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TicketError::TransitionsFetchFailed(format!(
                    "tracker returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| TicketError::TransitionsFetchFailed(format!("unreadable response: {e}")))?;

            Ok(parse_transitions(&body))
        })
    }

    fn apply_transition<'a>(
        &'a self,
        tenant: &'a Tenant,
        ticket_key: &'a str,
        transition_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TicketError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/issue/{}/transitions", Self::api_base(tenant), ticket_key);
            let body = json!({ "transition": { "id": transition_id } });

            let response = self
                .http
                .post(&url)
                .basic_auth(&tenant.tracker_user, Some(&tenant.tracker_token))
                .json(&body)
                .send()
                .await
                .map_err(|e| TicketError::TransitionApplyFailed {
                    transition_id: transition_id.to_string(),
                    message: e.to_string(),
                })?;

            if !response.status().is_success() {
                return Err(TicketError::TransitionApplyFailed {
                    transition_id: transition_id.to_string(),
                    message: format!("tracker returned HTTP {}", response.status()),
                });
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::common::entity::TenantId;

    fn make_tenant() -> Tenant {
        Tenant {
            id: TenantId("1".to_string()),
            access_token: "gh-token".to_string(),
            owner: "acme".to_string(),
            repo: "shop".to_string(),
            index: "findings-acme".to_string(),
            tracker_site: "127.0.0.1:1".to_string(),
            project_key: "SEC".to_string(),
            tracker_user: "bot@acme.example".to_string(),
            tracker_token: "jira-token".to_string(),
        }
    }

    #[test]
    fn api_base_uses_tracker_site() {
        let base = JiraTicketClient::api_base(&make_tenant());
        assert_eq!(base, "https://127.0.0.1:1/rest/api/2");
    }

    #[test]
    fn ticket_key_extracted_from_create_response() {
        let body = json!({"id": "10042", "key": "SEC-7", "self": "https://x/issue/10042"});
        assert_eq!(extract_ticket_key(&body), Some(TicketKey("SEC-7".to_string())));
    }

    #[test]
    fn missing_key_yields_none() {
        let body = json!({"id": "10042"});
        assert_eq!(extract_ticket_key(&body), None);
        assert_eq!(extract_ticket_key(&json!({})), None);
    }

    #[test]
    fn transitions_parsed_in_order() {
        let body = json!({
            "transitions": [
                {"id": "11", "name": "To In Progress", "fields": {}},
                {"id": "21", "name": "To Done"},
            ]
        });
        let transitions = parse_transitions(&body);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].id, "11");
        assert_eq!(transitions[0].name, "To In Progress");
        assert_eq!(transitions[1].id, "21");
    }

    #[test]
    fn missing_transitions_array_is_terminal() {
        assert!(parse_transitions(&json!({})).is_empty());
        assert!(parse_transitions(&json!({"transitions": []})).is_empty());
    }

    #[test]
    fn transition_without_id_is_skipped() {
        let body = json!({"transitions": [{"name": "broken"}, {"id": "5", "name": "ok"}]});
        let transitions = parse_transitions(&body);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].id, "5");
    }

    #[tokio::test]
    async fn create_issue_against_unreachable_tracker_errors() {
        let client = JiraTicketClient::new();
        let result = client
            .create_issue(&make_tenant(), "summary", "description")
            .await;
        assert!(matches!(result, Err(TicketError::CreateFailed(_))));
    }

    #[tokio::test]
    async fn list_transitions_against_unreachable_tracker_errors() {
        let client = JiraTicketClient::new();
        let result = client.list_transitions(&make_tenant(), "SEC-1").await;
        assert!(matches!(result, Err(TicketError::TransitionsFetchFailed(_))));
    }
}
