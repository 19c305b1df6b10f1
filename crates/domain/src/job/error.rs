use thiserror::Error;

use crate::common::entity::{TenantId, ToolType};
use crate::common::error::DomainError;
use crate::finding::error::IndexError;
use crate::runbook::error::RunbookError;
use crate::ticket::error::TicketError;
use crate::ticket::walker::WalkOutcome;

/// Failure of one job at its handler boundary.
///
/// Every handler returns this; the router logs it and converts it into a
/// FAILURE acknowledgement. Nothing here ever propagates past the job
/// boundary.
#[derive(Debug, Error)]
pub enum JobError {
    /// The tenant the job names does not exist. Fatal to the job — nothing
    /// can be resolved without its coordinates.
    #[error("tenant not found: {0}")]
    TenantNotFound(TenantId),

    /// The vendor refused or failed the alert mutation (auth, not-found,
    /// 5xx). Conflicts are not failures; they never reach this variant.
    #[error("{tool} alert {alert_number} update rejected by vendor")]
    VendorRejected { tool: ToolType, alert_number: u64 },

    /// The workflow walk ended without reaching a terminal node.
    #[error("workflow walk failed: {0}")]
    WalkFailed(WalkOutcome),

    #[error(transparent)]
    Ticket(#[from] TicketError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Runbook(#[from] RunbookError),

    #[error(transparent)]
    Store(#[from] DomainError),

    /// The envelope named a known job type but its payload did not parse.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
