use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::entity::{FindingId, TenantId, ToolType};

/// Request to mutate a vendor alert's state.
///
/// `requested_state` is free-form ("OPEN", "DISMISS", "RESOLVE", ...); the
/// vendor client maps it to the tool's wire representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFindingPayload {
    pub tenant_id: TenantId,
    pub tool_type: ToolType,
    pub alert_number: u64,
    pub requested_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketPayload {
    pub tenant_id: TenantId,
    pub finding_id: FindingId,
    pub summary: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTicketPayload {
    pub tenant_id: TenantId,
    pub ticket_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScanPayload {
    pub tenant_id: TenantId,
    /// Index-store document ids of the freshly ingested findings, in scan
    /// order.
    pub new_finding_ids: Vec<String>,
}

/// The typed payload variants, discriminated by the envelope's `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPayload {
    UpdateFinding(UpdateFindingPayload),
    CreateTicket(CreateTicketPayload),
    TransitionTicket(TransitionTicketPayload),
    NewScan(NewScanPayload),
}

impl JobPayload {
    /// Wire name of the discriminator, as it appears in the envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateFinding(_) => "UPDATE_FINDING",
            Self::CreateTicket(_) => "CREATE_TICKET",
            Self::TransitionTicket(_) => "TRANSITION_TICKET",
            Self::NewScan(_) => "NEW_SCAN",
        }
    }

    /// Whether `kind` names one of the four job types this engine handles.
    pub fn is_known_kind(kind: &str) -> bool {
        matches!(
            kind,
            "UPDATE_FINDING" | "CREATE_TICKET" | "TRANSITION_TICKET" | "NEW_SCAN"
        )
    }
}

/// One inbound job. Immutable once dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    /// Unique per job; generated at dispatch time if the producer omitted it.
    #[serde(rename = "jobId", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(flatten)]
    pub job: JobPayload,
}

impl JobEnvelope {
    pub fn new(job_id: impl Into<String>, job: JobPayload) -> Self {
        Self {
            job_id: Some(job_id.into()),
            job,
        }
    }

    /// The job id, or a fresh uuid when the producer omitted one.
    pub fn job_id_or_generate(&self) -> String {
        self.job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// Terminal status reported back for every handled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckStatus {
    Success,
    Failure,
}

/// Acknowledgement handed to the external sink at a job's terminal point.
/// Created once per job; never persisted by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub ack_id: String,
    pub job_id: String,
    pub status: AckStatus,
}

impl Acknowledgement {
    pub fn new(job_id: impl Into<String>, status: AckStatus) -> Self {
        Self {
            ack_id: Uuid::new_v4().to_string(),
            job_id: job_id.into(),
            status,
        }
    }
}
