use domain::common::entity::TenantId;
use domain::runbook::config::RunbookConfig;
use domain::runbook::entity::Runbook;
use domain::runbook::error::RunbookError;

/// Read-only access to externally authored runbooks and their configs.
///
/// Implementations parse stored filter/action blobs into the typed
/// `RunbookConfig` at load time; a blob that does not parse surfaces as
/// `RunbookError::MalformedConfig` for that runbook only.
pub trait RunbookStore: Send + Sync {
    fn runbooks_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Runbook>, RunbookError>;

    fn config_for_runbook(&self, runbook_id: &str) -> Result<Option<RunbookConfig>, RunbookError>;
}
