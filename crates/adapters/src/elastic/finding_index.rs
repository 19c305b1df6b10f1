use std::future::Future;
use std::pin::Pin;

use domain::common::entity::{FindingId, ToolType};
use domain::finding::entity::{CanonicalState, Finding};
use domain::finding::error::IndexError;
use ports::secondary::finding_index::FindingIndex;
use serde_json::{Value, json};

/// Finding-index client for Elasticsearch-style document stores.
///
/// Alert numbers and tool types are keyword fields on the finding documents,
/// so term queries match their exact string form.
pub struct EsFindingIndex {
    http: reqwest::Client,
    base_url: String,
}

impl EsFindingIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

/// Scripted partial update setting `state` on every document matching the
/// alert number.
fn update_state_body(alert_number: u64, state: CanonicalState) -> Value {
    json!({
        "query": {
            "term": { "alertNumber.keyword": alert_number.to_string() }
        },
        "script": {
            "source": "ctx._source.state = params.newState",
            "lang": "painless",
            "params": { "newState": state.as_str() }
        }
    })
}

/// Bool/must term query resolving a document by alert number and tool type.
fn find_doc_query(alert_number: u64, tool_type: ToolType) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "term": { "alertNumber.keyword": alert_number.to_string() } },
                    { "term": { "toolType.keyword": tool_type.as_str() } },
                ]
            }
        }
    })
}

fn ids_query(ids: &[String]) -> Value {
    json!({
        "size": ids.len(),
        "query": { "ids": { "values": ids } }
    })
}

/// Collect the `_source` documents of a search response, skipping hits that
/// do not parse as findings.
fn collect_findings(body: &Value) -> Vec<Finding> {
    body.pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let source = hit.get("_source")?;
                    match serde_json::from_value::<Finding>(source.clone()) {
                        Ok(finding) => Some(finding),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping unparsable finding document");
                            None
                        }
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

impl FindingIndex for EsFindingIndex {
    fn update_state<'a>(
        &'a self,
        index: &'a str,
        alert_number: u64,
        state: CanonicalState,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/{}/_update_by_query?conflicts=proceed",
                self.base_url, index
            );
            let response = self
                .http
                .post(&url)
                .json(&update_state_body(alert_number, state))
                .send()
                .await
                .map_err(|e| IndexError::UpdateFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(IndexError::UpdateFailed(format!(
                    "index returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| IndexError::UpdateFailed(format!("unreadable response: {e}")))?;

            let failures = body
                .get("failures")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            if failures > 0 {
                return Err(IndexError::UpdateFailed(format!(
                    "{failures} document update failures"
                )));
            }

            tracing::debug!(
                index,
                alert_number,
                state = state.as_str(),
                updated = body.get("updated").and_then(|v| v.as_u64()),
                "canonical state written"
            );
            Ok(())
        })
    }

    fn find_doc_id<'a>(
        &'a self,
        index: &'a str,
        alert_number: u64,
        tool_type: ToolType,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FindingId>, IndexError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/{}/_search", self.base_url, index);
            let response = self
                .http
                .post(&url)
                .json(&find_doc_query(alert_number, tool_type))
                .send()
                .await
                .map_err(|e| IndexError::SearchFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(IndexError::SearchFailed(format!(
                    "index returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| IndexError::SearchFailed(format!("unreadable response: {e}")))?;

            Ok(collect_findings(&body).into_iter().next().map(|f| f.id))
        })
    }

    fn fetch_by_ids<'a>(
        &'a self,
        index: &'a str,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Finding>, IndexError>> + Send + 'a>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let url = format!("{}/{}/_search", self.base_url, index);
            let response = self
                .http
                .post(&url)
                .json(&ids_query(ids))
                .send()
                .await
                .map_err(|e| IndexError::SearchFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(IndexError::SearchFailed(format!(
                    "index returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| IndexError::SearchFailed(format!("unreadable response: {e}")))?;

            Ok(collect_findings(&body))
        })
    }

    fn set_ticket_id<'a>(
        &'a self,
        index: &'a str,
        finding_id: &'a FindingId,
        ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/{}/_update/{}", self.base_url, index, finding_id);
            let body = json!({ "doc": { "ticketId": ticket_key } });

            let response = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| IndexError::UpdateFailed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(IndexError::UpdateFailed(format!(
                    "index returned HTTP {}",
                    response.status()
                )));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_state_body_targets_alert_number_keyword() {
        let body = update_state_body(17, CanonicalState::Suppressed);
        assert_eq!(body["query"]["term"]["alertNumber.keyword"], "17");
        assert_eq!(body["script"]["params"]["newState"], "SUPPRESSED");
        assert_eq!(body["script"]["lang"], "painless");
    }

    #[test]
    fn find_doc_query_matches_both_terms() {
        let query = find_doc_query(42, ToolType::SecretScanning);
        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);
        assert_eq!(must[0]["term"]["alertNumber.keyword"], "42");
        assert_eq!(must[1]["term"]["toolType.keyword"], "SECRET_SCANNING");
    }

    #[test]
    fn ids_query_sizes_to_input() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let query = ids_query(&ids);
        assert_eq!(query["size"], 2);
        assert_eq!(query["query"]["ids"]["values"][1], "b");
    }

    #[test]
    fn collect_findings_skips_unparsable_hits() {
        let body = json!({
            "hits": {
                "hits": [
                    { "_id": "f-1", "_source": {
                        "id": "f-1", "alertNumber": "1",
                        "toolType": "DEPENDABOT", "severity": "HIGH"
                    }},
                    { "_id": "junk", "_source": { "id": "junk" } },
                ]
            }
        });
        let findings = collect_findings(&body);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id.0, "f-1");
    }

    #[test]
    fn collect_findings_tolerates_empty_response() {
        assert!(collect_findings(&json!({})).is_empty());
        assert!(collect_findings(&json!({"hits": {"hits": []}})).is_empty());
    }

    #[tokio::test]
    async fn fetch_by_ids_short_circuits_on_empty_input() {
        // No index running anywhere, so a non-empty fetch would error; the
        // empty fetch must not even attempt the request.
        let client = EsFindingIndex::new("http://127.0.0.1:1");
        let findings = client.fetch_by_ids("findings", &[]).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn unreachable_index_surfaces_search_error() {
        let client = EsFindingIndex::new("http://127.0.0.1:1");
        let ids = vec!["f-1".to_string()];
        let result = client.fetch_by_ids("findings", &ids).await;
        assert!(matches!(result, Err(IndexError::SearchFailed(_))));
    }
}
