use serde::{Deserialize, Serialize};

use crate::common::entity::TenantId;

/// Tenant-authored automation rule. A disabled runbook is inert.
///
/// Externally persisted; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runbook {
    pub runbook_id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub enabled: bool,
}
