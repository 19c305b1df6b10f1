use std::sync::Arc;

use domain::alert::reason::map_reason;
use domain::common::entity::Tenant;
use domain::finding::state::normalize;
use domain::job::entity::{TransitionTicketPayload, UpdateFindingPayload};
use domain::job::error::JobError;
use ports::secondary::finding_index::FindingIndex;
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_link_store::TicketLinkStore;
use ports::secondary::vendor_alert::VendorAlertApi;
use uuid::Uuid;

use crate::acker::AckEmitter;
use crate::transition_ticket::WorkflowService;

/// Handles UPDATE_FINDING jobs: mutate the vendor alert, write the canonical
/// state back to the index, and chain into the linked ticket's workflow when
/// the finding lands in a done state.
///
/// The chained transition runs inline as its own job with its own
/// acknowledgement; its failure is logged but does not retroactively fail
/// this job's already-applied vendor and index mutations.
pub struct UpdateFindingService {
    tenants: Arc<dyn TenantStore>,
    vendor: Arc<dyn VendorAlertApi>,
    index: Arc<dyn FindingIndex>,
    links: Arc<dyn TicketLinkStore>,
    workflow: Arc<WorkflowService>,
    acks: Arc<AckEmitter>,
}

impl UpdateFindingService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        vendor: Arc<dyn VendorAlertApi>,
        index: Arc<dyn FindingIndex>,
        links: Arc<dyn TicketLinkStore>,
        workflow: Arc<WorkflowService>,
        acks: Arc<AckEmitter>,
    ) -> Self {
        Self {
            tenants,
            vendor,
            index,
            links,
            workflow,
            acks,
        }
    }

    pub async fn handle(
        &self,
        job_id: &str,
        payload: &UpdateFindingPayload,
    ) -> Result<(), JobError> {
        let tenant = self
            .tenants
            .find_by_id(&payload.tenant_id)?
            .ok_or_else(|| JobError::TenantNotFound(payload.tenant_id.clone()))?;

        let mapped_reason = map_reason(
            Some(payload.tool_type),
            payload.reason.as_deref(),
            &payload.requested_state,
        );

        let accepted = self
            .vendor
            .set_alert_state(
                &tenant.access_token,
                &tenant.owner,
                &tenant.repo,
                payload.tool_type,
                payload.alert_number,
                &payload.requested_state,
                mapped_reason.as_deref(),
            )
            .await;
        if !accepted {
            return Err(JobError::VendorRejected {
                tool: payload.tool_type,
                alert_number: payload.alert_number,
            });
        }

        let canonical = normalize(
            &payload.requested_state,
            Some(payload.tool_type),
            mapped_reason.as_deref(),
        );
        self.index
            .update_state(&tenant.index, payload.alert_number, canonical)
            .await?;

        tracing::info!(
            job_id,
            tenant = %tenant.id,
            tool = %payload.tool_type,
            alert_number = payload.alert_number,
            state = canonical.as_str(),
            "finding state reconciled"
        );

        if canonical.is_done() {
            self.chain_ticket_transition(job_id, &tenant, payload).await?;
        }

        Ok(())
    }

    /// A finding that just reached a done state closes its linked ticket, if
    /// one exists. Absence of a link is a skip, not an error.
    async fn chain_ticket_transition(
        &self,
        job_id: &str,
        tenant: &Tenant,
        payload: &UpdateFindingPayload,
    ) -> Result<(), JobError> {
        let Some(finding_id) = self
            .index
            .find_doc_id(&tenant.index, payload.alert_number, payload.tool_type)
            .await?
        else {
            return Ok(());
        };

        let Some(link) = self.links.find_by_finding_id(&finding_id)? else {
            tracing::info!(
                job_id,
                finding = %finding_id,
                "no ticket link for finding, skipping transition"
            );
            return Ok(());
        };

        let transition_job_id = format!("transition_{}", Uuid::new_v4());
        let transition = TransitionTicketPayload {
            tenant_id: link.tenant_id.clone(),
            ticket_id: link.ticket_id.clone(),
        };

        tracing::info!(
            parent_job = job_id,
            job_id = %transition_job_id,
            ticket = %transition.ticket_id,
            "auto-transitioning linked ticket"
        );

        let result = self.workflow.handle(&transition_job_id, &transition).await;
        if let Err(e) = &result {
            tracing::warn!(
                job_id = %transition_job_id,
                ticket = %transition.ticket_id,
                error = %e,
                "auto-transition failed"
            );
        }
        self.acks.emit(&transition_job_id, result.is_ok()).await;

        Ok(())
    }
}
