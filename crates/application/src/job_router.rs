use std::sync::Arc;

use domain::job::entity::{JobEnvelope, JobPayload};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::acker::AckEmitter;
use crate::create_ticket::TicketService;
use crate::new_scan::RunbookService;
use crate::transition_ticket::WorkflowService;
use crate::update_finding::UpdateFindingService;

/// Dispatches inbound job envelopes to their handlers and acknowledges every
/// terminal outcome.
///
/// This is the single failure boundary: handler errors are logged here and
/// converted into FAILURE acknowledgements, never propagated to the
/// delivery layer. Messages with an unknown `type` are logged and dropped
/// with no acknowledgement — they are not addressable jobs.
pub struct JobRouter {
    update: Arc<UpdateFindingService>,
    tickets: Arc<TicketService>,
    workflow: Arc<WorkflowService>,
    scans: Arc<RunbookService>,
    acks: Arc<AckEmitter>,
}

impl JobRouter {
    pub fn new(
        update: Arc<UpdateFindingService>,
        tickets: Arc<TicketService>,
        workflow: Arc<WorkflowService>,
        scans: Arc<RunbookService>,
        acks: Arc<AckEmitter>,
    ) -> Self {
        Self {
            update,
            tickets,
            workflow,
            scans,
            acks,
        }
    }

    /// Handle one raw message: peek the `type` discriminator, parse the
    /// typed envelope, dispatch, acknowledge.
    pub async fn dispatch_raw(&self, raw: &str) {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable job message");
                return;
            }
        };

        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        if !JobPayload::is_known_kind(kind) {
            tracing::warn!(job_type = kind, "dropping job with unknown type");
            return;
        }

        match serde_json::from_value::<JobEnvelope>(value.clone()) {
            Ok(envelope) => self.dispatch(&envelope).await,
            Err(e) => {
                // Known type, broken payload: the job is addressable, so it
                // is acknowledged as failed.
                let job_id = value
                    .get("jobId")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                tracing::error!(job_id = %job_id, job_type = kind, error = %e, "malformed job payload");
                self.acks.emit(&job_id, false).await;
            }
        }
    }

    /// Dispatch a typed envelope and acknowledge the outcome.
    pub async fn dispatch(&self, envelope: &JobEnvelope) {
        let job_id = envelope.job_id_or_generate();

        let result = match &envelope.job {
            JobPayload::UpdateFinding(payload) => self.update.handle(&job_id, payload).await,
            JobPayload::CreateTicket(payload) => {
                self.tickets.handle(&job_id, payload).await.map(|_| ())
            }
            JobPayload::TransitionTicket(payload) => self.workflow.handle(&job_id, payload).await,
            JobPayload::NewScan(payload) => self.scans.handle(&job_id, payload).await,
        };

        match &result {
            Ok(()) => {
                tracing::info!(job_id = %job_id, job_type = envelope.job.kind(), "job completed");
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    job_type = envelope.job.kind(),
                    error = %e,
                    "job failed"
                );
            }
        }

        self.acks.emit(&job_id, result.is_ok()).await;
    }

    /// Run loop: consume raw messages until the channel closes or the
    /// cancellation token fires, draining anything already queued on
    /// shutdown.
    pub async fn run(&self, mut rx: mpsc::Receiver<String>, cancel: CancellationToken) {
        let mut count: u64 = 0;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    while let Ok(raw) = rx.try_recv() {
                        count += 1;
                        self.dispatch_raw(&raw).await;
                    }
                    break;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(raw) => {
                            count += 1;
                            self.dispatch_raw(&raw).await;
                        }
                        None => break, // channel closed
                    }
                }
            }
        }

        tracing::info!(total_jobs = count, "job router stopped");
    }
}
