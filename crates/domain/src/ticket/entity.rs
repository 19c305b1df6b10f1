use serde::{Deserialize, Serialize};

use crate::common::entity::{FindingId, TenantId};

/// Persisted 1:1 association between a finding and a tracker ticket.
///
/// At most one link exists per finding; it is written exactly once, at
/// ticket-creation time, and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketLink {
    pub tenant_id: TenantId,
    pub ticket_id: String,
    pub finding_id: FindingId,
}

/// One legal workflow transition as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    #[serde(default)]
    pub name: String,
}
