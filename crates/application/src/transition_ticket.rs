use std::sync::Arc;

use domain::job::entity::TransitionTicketPayload;
use domain::job::error::JobError;
use domain::ticket::walker::{WalkPolicy, WalkStep, WalkTracker};
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_tracker::TicketTrackerApi;

use crate::keyed_lock::KeyedMutex;

/// Drives a ticket through its workflow graph to a terminal node.
///
/// The walk is structural: each round fetches the currently legal
/// transitions and applies the first one listed. The `WalkTracker` bounds
/// the loop with a step cap and repeated-transition detection, so a cyclic
/// or ever-growing workflow ends in a reported failure instead of spinning
/// forever. The whole walk holds a per-ticket lock: redelivered copies of
/// the same event serialize instead of racing the remote workflow.
pub struct WorkflowService {
    tenants: Arc<dyn TenantStore>,
    tracker: Arc<dyn TicketTrackerApi>,
    policy: WalkPolicy,
    ticket_locks: KeyedMutex,
}

impl WorkflowService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        tracker: Arc<dyn TicketTrackerApi>,
        policy: WalkPolicy,
    ) -> Self {
        Self {
            tenants,
            tracker,
            policy,
            ticket_locks: KeyedMutex::new(),
        }
    }

    pub async fn handle(
        &self,
        job_id: &str,
        payload: &TransitionTicketPayload,
    ) -> Result<(), JobError> {
        let tenant = self
            .tenants
            .find_by_id(&payload.tenant_id)?
            .ok_or_else(|| JobError::TenantNotFound(payload.tenant_id.clone()))?;

        let _guard = self.ticket_locks.lock(&payload.ticket_id).await;

        let mut walk = WalkTracker::new(self.policy);
        loop {
            let transitions = self
                .tracker
                .list_transitions(&tenant, &payload.ticket_id)
                .await?;

            match walk.next_step(&transitions) {
                WalkStep::Apply(transition) => {
                    tracing::info!(
                        job_id,
                        ticket = %payload.ticket_id,
                        transition_id = %transition.id,
                        transition = %transition.name,
                        "applying workflow transition"
                    );
                    self.tracker
                        .apply_transition(&tenant, &payload.ticket_id, &transition.id)
                        .await?;
                }
                WalkStep::Done(outcome) if outcome.is_terminal() => {
                    tracing::info!(
                        job_id,
                        ticket = %payload.ticket_id,
                        steps = walk.steps(),
                        "ticket reached terminal workflow node"
                    );
                    return Ok(());
                }
                WalkStep::Done(outcome) => {
                    return Err(JobError::WalkFailed(outcome));
                }
            }
        }
    }
}
