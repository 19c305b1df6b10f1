use std::sync::Arc;

use domain::common::entity::Tenant;
use domain::finding::entity::Finding;
use domain::job::entity::{CreateTicketPayload, NewScanPayload, UpdateFindingPayload};
use domain::job::error::JobError;
use domain::runbook::engine::{RunbookAction, evaluate};
use ports::secondary::finding_index::FindingIndex;
use ports::secondary::runbook_store::RunbookStore;
use ports::secondary::tenant_store::TenantStore;
use uuid::Uuid;

use crate::acker::AckEmitter;
use crate::create_ticket::TicketService;
use crate::update_finding::UpdateFindingService;

/// Handles NEW_SCAN jobs: evaluate the tenant's enabled runbooks against the
/// freshly ingested findings and fire the derived actions.
///
/// Each (runbook, finding) pair evaluates independently and every derived
/// action runs inline as its own job with its own acknowledgement. Action
/// failures are logged without aborting the scan; re-delivery of the same
/// NEW_SCAN job re-applies all matching actions (no de-duplication across
/// runs).
pub struct RunbookService {
    tenants: Arc<dyn TenantStore>,
    runbooks: Arc<dyn RunbookStore>,
    index: Arc<dyn FindingIndex>,
    update: Arc<UpdateFindingService>,
    tickets: Arc<TicketService>,
    acks: Arc<AckEmitter>,
}

impl RunbookService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        runbooks: Arc<dyn RunbookStore>,
        index: Arc<dyn FindingIndex>,
        update: Arc<UpdateFindingService>,
        tickets: Arc<TicketService>,
        acks: Arc<AckEmitter>,
    ) -> Self {
        Self {
            tenants,
            runbooks,
            index,
            update,
            tickets,
            acks,
        }
    }

    pub async fn handle(&self, job_id: &str, payload: &NewScanPayload) -> Result<(), JobError> {
        let tenant = self
            .tenants
            .find_by_id(&payload.tenant_id)?
            .ok_or_else(|| JobError::TenantNotFound(payload.tenant_id.clone()))?;

        let runbooks = self.runbooks.runbooks_for_tenant(&payload.tenant_id)?;
        tracing::info!(
            job_id,
            tenant = %tenant.id,
            runbooks = runbooks.len(),
            findings = payload.new_finding_ids.len(),
            "evaluating runbooks for new scan"
        );

        for runbook in &runbooks {
            if !runbook.enabled {
                continue;
            }

            let config = match self.runbooks.config_for_runbook(&runbook.runbook_id) {
                Ok(Some(config)) => config,
                Ok(None) => continue,
                Err(e) => {
                    // Malformed config skips this runbook only.
                    tracing::warn!(
                        job_id,
                        runbook = %runbook.runbook_id,
                        error = %e,
                        "skipping runbook with unusable config"
                    );
                    continue;
                }
            };
            if !config.is_new_scan_trigger() {
                continue;
            }

            // Fetched per runbook so each config sees the index state current
            // at its turn, after earlier runbooks' inline updates.
            let findings = self
                .index
                .fetch_by_ids(&tenant.index, &payload.new_finding_ids)
                .await?;

            for finding in &findings {
                for action in evaluate(&config, finding) {
                    self.apply_action(job_id, &tenant, finding, action).await;
                }
            }
        }

        Ok(())
    }

    /// Run one derived action as its own inline job: log, execute,
    /// acknowledge. Failures stay on this boundary.
    async fn apply_action(
        &self,
        parent_job_id: &str,
        tenant: &Tenant,
        finding: &Finding,
        action: RunbookAction,
    ) {
        match action {
            RunbookAction::UpdateFinding {
                vendor_action,
                reason,
            } => {
                let Ok(alert_number) = finding.alert_number.parse::<u64>() else {
                    tracing::warn!(
                        parent_job = parent_job_id,
                        finding = %finding.id,
                        alert_number = %finding.alert_number,
                        "finding has a non-numeric alert number, skipping update action"
                    );
                    return;
                };

                let payload = UpdateFindingPayload {
                    tenant_id: tenant.id.clone(),
                    tool_type: finding.tool_type,
                    alert_number,
                    requested_state: vendor_action,
                    reason: Some(reason),
                };
                let job_id = Uuid::new_v4().to_string();
                tracing::info!(
                    parent_job = parent_job_id,
                    job_id = %job_id,
                    finding = %finding.id,
                    action = %payload.requested_state,
                    "runbook triggered finding update"
                );

                let result = self.update.handle(&job_id, &payload).await;
                if let Err(e) = &result {
                    tracing::warn!(job_id = %job_id, error = %e, "runbook update action failed");
                }
                self.acks.emit(&job_id, result.is_ok()).await;
            }
            RunbookAction::CreateTicket {
                summary,
                description,
            } => {
                let payload = CreateTicketPayload {
                    tenant_id: tenant.id.clone(),
                    finding_id: finding.id.clone(),
                    summary,
                    description,
                };
                let job_id = format!("ticket_{}", Uuid::new_v4());
                tracing::info!(
                    parent_job = parent_job_id,
                    job_id = %job_id,
                    finding = %finding.id,
                    "runbook triggered ticket creation"
                );

                let result = self.tickets.handle(&job_id, &payload).await;
                if let Err(e) = &result {
                    tracing::warn!(job_id = %job_id, error = %e, "runbook ticket action failed");
                }
                self.acks.emit(&job_id, result.is_ok()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        MockAckSink, MockIndex, MockLinkStore, MockRunbookStore, MockTenantStore, MockTracker,
        MockVendor, make_finding, make_tenant,
    };
    use crate::transition_ticket::WorkflowService;
    use domain::common::entity::TenantId;
    use domain::finding::entity::CanonicalState;
    use domain::job::entity::AckStatus;
    use domain::runbook::config::RunbookConfig;
    use domain::runbook::entity::Runbook;
    use domain::ticket::walker::WalkPolicy;
    use ports::secondary::ack_sink::AckSink;
    use ports::secondary::tenant_store::TenantStore;
    use ports::secondary::ticket_link_store::TicketLinkStore;
    use ports::secondary::ticket_tracker::TicketTrackerApi;
    use ports::secondary::vendor_alert::VendorAlertApi;

    struct Fixture {
        vendor: Arc<MockVendor>,
        index: Arc<MockIndex>,
        links: Arc<MockLinkStore>,
        sink: Arc<MockAckSink>,
        service: RunbookService,
    }

    fn make_runbook(id: &str, enabled: bool) -> Runbook {
        Runbook {
            runbook_id: id.to_string(),
            tenant_id: TenantId("1".to_string()),
            name: format!("runbook {id}"),
            enabled,
        }
    }

    fn make_fixture(store: MockRunbookStore, index: MockIndex) -> Fixture {
        let tenants = Arc::new(MockTenantStore::with(vec![make_tenant("1")]));
        let vendor = Arc::new(MockVendor::succeeding());
        let index = Arc::new(index);
        let links = Arc::new(MockLinkStore::new());
        let tracker = Arc::new(MockTracker::creating("SEC-1"));
        let sink = Arc::new(MockAckSink::new());
        let acks = Arc::new(AckEmitter::new(Arc::clone(&sink) as Arc<dyn AckSink>));

        let workflow = Arc::new(WorkflowService::new(
            Arc::clone(&tenants) as Arc<dyn TenantStore>,
            Arc::clone(&tracker) as Arc<dyn TicketTrackerApi>,
            WalkPolicy::default(),
        ));
        let update = Arc::new(UpdateFindingService::new(
            Arc::clone(&tenants) as Arc<dyn TenantStore>,
            Arc::clone(&vendor) as Arc<dyn VendorAlertApi>,
            Arc::clone(&index) as Arc<dyn FindingIndex>,
            Arc::clone(&links) as Arc<dyn TicketLinkStore>,
            workflow,
            Arc::clone(&acks),
        ));
        let tickets = Arc::new(TicketService::new(
            Arc::clone(&tenants) as Arc<dyn TenantStore>,
            tracker as Arc<dyn TicketTrackerApi>,
            Arc::clone(&index) as Arc<dyn FindingIndex>,
            Arc::clone(&links) as Arc<dyn TicketLinkStore>,
        ));
        let service = RunbookService::new(
            tenants,
            Arc::new(store),
            Arc::clone(&index) as Arc<dyn FindingIndex>,
            update,
            tickets,
            acks,
        );
        Fixture {
            vendor,
            index,
            links,
            sink,
            service,
        }
    }

    fn scan_payload(ids: &[&str]) -> NewScanPayload {
        NewScanPayload {
            tenant_id: TenantId("1".to_string()),
            new_finding_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn suppress_open_config(id: &str) -> RunbookConfig {
        RunbookConfig::from_json_parts(
            id,
            "NEW_SCAN",
            r#"{"state": "OPEN"}"#,
            r#"{"update_finding": {"from": "OPEN", "to": "SUPPRESSED"}}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn matching_runbook_synthesizes_dismiss_update() {
        let fixture = make_fixture(
            MockRunbookStore::with(
                vec![make_runbook("rb-1", true)],
                vec![suppress_open_config("rb-1")],
            ),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        // The derived vendor action for SUPPRESSED is DISMISS, reason "other"
        // mapped into the code-scanning vocabulary.
        let calls = fixture.vendor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].alert_number, 17);
        assert_eq!(calls[0].requested_state, "DISMISS");
        assert_eq!(calls[0].mapped_reason.as_deref(), Some("won't fix"));

        // The inline update job got its own acknowledgement.
        let acks = fixture.sink.emitted();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].status, AckStatus::Success);

        // And the index now holds the normalized state.
        assert_eq!(
            fixture.index.state_updates(),
            vec![(17, CanonicalState::Suppressed)]
        );
    }

    #[tokio::test]
    async fn disabled_runbook_is_inert() {
        let fixture = make_fixture(
            MockRunbookStore::with(
                vec![make_runbook("rb-1", false)],
                vec![suppress_open_config("rb-1")],
            ),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        assert!(fixture.vendor.calls().is_empty());
        assert!(fixture.sink.emitted().is_empty());
    }

    #[tokio::test]
    async fn non_new_scan_trigger_is_skipped() {
        let config = RunbookConfig::from_json_parts("rb-1", "SCHEDULED", "", "").unwrap();
        let fixture = make_fixture(
            MockRunbookStore::with(vec![make_runbook("rb-1", true)], vec![config]),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        assert!(fixture.vendor.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_config_skips_that_runbook_only() {
        let fixture = make_fixture(
            MockRunbookStore::with(
                vec![make_runbook("rb-bad", true), make_runbook("rb-good", true)],
                vec![suppress_open_config("rb-good")],
            )
            .with_malformed("rb-bad"),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        // rb-good still fired despite rb-bad's unparsable config.
        assert_eq!(fixture.vendor.calls().len(), 1);
    }

    #[tokio::test]
    async fn filter_mismatch_fires_nothing() {
        let config = RunbookConfig::from_json_parts(
            "rb-1",
            "NEW_SCAN",
            r#"{"state": "FIXED"}"#,
            r#"{"update_finding": {"to": "SUPPRESSED"}}"#,
        )
        .unwrap();
        let fixture = make_fixture(
            MockRunbookStore::with(vec![make_runbook("rb-1", true)], vec![config]),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        assert!(fixture.vendor.calls().is_empty());
    }

    #[tokio::test]
    async fn create_ticket_action_links_finding() {
        let config = RunbookConfig::from_json_parts(
            "rb-1",
            "NEW_SCAN",
            "",
            r#"{"create_ticket": true}"#,
        )
        .unwrap();
        let fixture = make_fixture(
            MockRunbookStore::with(vec![make_runbook("rb-1", true)], vec![config]),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        let saved = fixture.links.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].ticket_id, "SEC-1");
        assert_eq!(saved[0].finding_id.0, "f-1");

        let acks = fixture.sink.emitted();
        assert_eq!(acks.len(), 1);
        assert!(acks[0].job_id.starts_with("ticket_"));
        assert_eq!(acks[0].status, AckStatus::Success);
    }

    #[tokio::test]
    async fn one_finding_can_trigger_multiple_runbooks() {
        let ticket_config =
            RunbookConfig::from_json_parts("rb-2", "NEW_SCAN", "", r#"{"create_ticket": true}"#)
                .unwrap();
        let fixture = make_fixture(
            MockRunbookStore::with(
                vec![make_runbook("rb-1", true), make_runbook("rb-2", true)],
                vec![suppress_open_config("rb-1"), ticket_config],
            ),
            MockIndex::with_findings(vec![make_finding("f-1", "17", CanonicalState::Open)]),
        );

        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap();

        // One update action and one ticket action, each with its own ack.
        assert_eq!(fixture.vendor.calls().len(), 1);
        assert_eq!(fixture.links.saved().len(), 1);
        assert_eq!(fixture.sink.emitted().len(), 2);
    }

    #[tokio::test]
    async fn failed_action_does_not_abort_the_scan() {
        let fixture = {
            let tenants = Arc::new(MockTenantStore::with(vec![make_tenant("1")]));
            let vendor = Arc::new(MockVendor::failing());
            let index = Arc::new(MockIndex::with_findings(vec![
                make_finding("f-1", "17", CanonicalState::Open),
                make_finding("f-2", "18", CanonicalState::Open),
            ]));
            let links = Arc::new(MockLinkStore::new());
            let tracker = Arc::new(MockTracker::creating("SEC-1"));
            let sink = Arc::new(MockAckSink::new());
            let acks = Arc::new(AckEmitter::new(Arc::clone(&sink) as Arc<dyn AckSink>));
            let workflow = Arc::new(WorkflowService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                Arc::clone(&tracker) as Arc<dyn TicketTrackerApi>,
                WalkPolicy::default(),
            ));
            let update = Arc::new(UpdateFindingService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                Arc::clone(&vendor) as Arc<dyn VendorAlertApi>,
                Arc::clone(&index) as Arc<dyn FindingIndex>,
                Arc::clone(&links) as Arc<dyn TicketLinkStore>,
                workflow,
                Arc::clone(&acks),
            ));
            let tickets = Arc::new(TicketService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                tracker as Arc<dyn TicketTrackerApi>,
                Arc::clone(&index) as Arc<dyn FindingIndex>,
                Arc::clone(&links) as Arc<dyn TicketLinkStore>,
            ));
            let service = RunbookService::new(
                tenants,
                Arc::new(MockRunbookStore::with(
                    vec![make_runbook("rb-1", true)],
                    vec![suppress_open_config("rb-1")],
                )),
                Arc::clone(&index) as Arc<dyn FindingIndex>,
                update,
                tickets,
                acks,
            );
            Fixture {
                vendor,
                index,
                links,
                sink,
                service,
            }
        };

        // Vendor rejects everything; the scan itself still succeeds.
        fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1", "f-2"]))
            .await
            .unwrap();

        // Both inline updates were attempted and failed on their own
        // boundaries.
        assert_eq!(fixture.vendor.calls().len(), 2);
        let acks = fixture.sink.emitted();
        assert_eq!(acks.len(), 2);
        assert!(acks.iter().all(|a| a.status == AckStatus::Failure));
    }

    #[tokio::test]
    async fn unknown_tenant_is_fatal() {
        let mut fixture = make_fixture(
            MockRunbookStore::with(vec![], vec![]),
            MockIndex::new(),
        );
        fixture.service = {
            let tenants = Arc::new(MockTenantStore::empty());
            let tracker = Arc::new(MockTracker::creating("SEC-1"));
            let sink = Arc::new(MockAckSink::new());
            let acks = Arc::new(AckEmitter::new(sink as Arc<dyn AckSink>));
            let workflow = Arc::new(WorkflowService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                Arc::clone(&tracker) as Arc<dyn TicketTrackerApi>,
                WalkPolicy::default(),
            ));
            let update = Arc::new(UpdateFindingService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                Arc::new(MockVendor::succeeding()),
                Arc::new(MockIndex::new()),
                Arc::new(MockLinkStore::new()),
                workflow,
                Arc::clone(&acks),
            ));
            let tickets = Arc::new(TicketService::new(
                Arc::clone(&tenants) as Arc<dyn TenantStore>,
                tracker as Arc<dyn TicketTrackerApi>,
                Arc::new(MockIndex::new()),
                Arc::new(MockLinkStore::new()),
            ));
            RunbookService::new(
                tenants,
                Arc::new(MockRunbookStore::with(vec![], vec![])),
                Arc::new(MockIndex::new()),
                update,
                tickets,
                acks,
            )
        };

        let err = fixture
            .service
            .handle("scan-1", &scan_payload(&["f-1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::TenantNotFound(_)));
    }
}
