use std::sync::Arc;

use domain::common::entity::TicketKey;
use domain::job::entity::CreateTicketPayload;
use domain::job::error::JobError;
use domain::ticket::entity::TicketLink;
use ports::secondary::finding_index::FindingIndex;
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_link_store::TicketLinkStore;
use ports::secondary::ticket_tracker::TicketTrackerApi;

use crate::keyed_lock::KeyedMutex;

/// Creates tracker tickets for findings and records the finding↔ticket link.
///
/// Ordering matters: the remote create happens first, then the ticket key is
/// written back onto the finding document, then exactly one link row is
/// persisted. A create response without a key is fatal — a ticket with no
/// retrievable identity cannot be linked. If the link write fails, the
/// created ticket is temporarily unlinked: the job fails so the condition is
/// visible, and external reconciliation picks it up.
pub struct TicketService {
    tenants: Arc<dyn TenantStore>,
    tracker: Arc<dyn TicketTrackerApi>,
    index: Arc<dyn FindingIndex>,
    links: Arc<dyn TicketLinkStore>,
    finding_locks: KeyedMutex,
}

impl TicketService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        tracker: Arc<dyn TicketTrackerApi>,
        index: Arc<dyn FindingIndex>,
        links: Arc<dyn TicketLinkStore>,
    ) -> Self {
        Self {
            tenants,
            tracker,
            index,
            links,
            finding_locks: KeyedMutex::new(),
        }
    }

    pub async fn handle(
        &self,
        job_id: &str,
        payload: &CreateTicketPayload,
    ) -> Result<TicketKey, JobError> {
        let tenant = self
            .tenants
            .find_by_id(&payload.tenant_id)?
            .ok_or_else(|| JobError::TenantNotFound(payload.tenant_id.clone()))?;

        let ticket_key = self
            .tracker
            .create_issue(&tenant, &payload.summary, &payload.description)
            .await?;

        tracing::info!(
            job_id,
            ticket = %ticket_key,
            finding = %payload.finding_id,
            "ticket created"
        );

        // The write-back and the link row are the finding's mutable side;
        // serialize them per finding so redelivered creates cannot interleave.
        let _guard = self.finding_locks.lock(&payload.finding_id.0).await;

        self.index
            .set_ticket_id(&tenant.index, &payload.finding_id, &ticket_key.0)
            .await?;

        let link = TicketLink {
            tenant_id: tenant.id.clone(),
            ticket_id: ticket_key.0.clone(),
            finding_id: payload.finding_id.clone(),
        };
        if let Err(e) = self.links.save(&link) {
            tracing::error!(
                job_id,
                ticket = %ticket_key,
                finding = %payload.finding_id,
                error = %e,
                "ticket created but link persistence failed; ticket is unlinked"
            );
            return Err(e.into());
        }

        Ok(ticket_key)
    }
}
