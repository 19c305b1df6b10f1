use std::collections::HashMap;
use std::sync::Mutex;

use domain::common::entity::{FindingId, Tenant, TenantId};
use domain::common::error::DomainError;
use domain::runbook::config::RunbookConfig;
use domain::runbook::entity::Runbook;
use domain::runbook::error::RunbookError;
use domain::ticket::entity::TicketLink;
use ports::secondary::runbook_store::RunbookStore;
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_link_store::TicketLinkStore;

/// Tenant store backed by configuration loaded at startup.
///
/// Tenants are externally authored and read-only to the engine, so a
/// config-populated map is all the worker needs.
pub struct InMemoryTenantStore {
    tenants: HashMap<String, Tenant>,
}

impl InMemoryTenantStore {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self {
            tenants: tenants.into_iter().map(|t| (t.id.0.clone(), t)).collect(),
        }
    }
}

impl TenantStore for InMemoryTenantStore {
    fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tenants.get(&id.0).cloned())
    }
}

/// Runbook store backed by configuration loaded at startup, with configs
/// already parsed into their typed form.
pub struct InMemoryRunbookStore {
    runbooks: Vec<Runbook>,
    configs: HashMap<String, RunbookConfig>,
}

impl InMemoryRunbookStore {
    pub fn new(runbooks: Vec<Runbook>, configs: Vec<RunbookConfig>) -> Self {
        Self {
            runbooks,
            configs: configs
                .into_iter()
                .map(|c| (c.runbook_id.clone(), c))
                .collect(),
        }
    }
}

impl RunbookStore for InMemoryRunbookStore {
    fn runbooks_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Runbook>, RunbookError> {
        Ok(self
            .runbooks
            .iter()
            .filter(|rb| &rb.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn config_for_runbook(&self, runbook_id: &str) -> Result<Option<RunbookConfig>, RunbookError> {
        Ok(self.configs.get(runbook_id).cloned())
    }
}

/// Volatile link store for development and tests.
#[derive(Default)]
pub struct InMemoryTicketLinkStore {
    links: Mutex<HashMap<String, TicketLink>>,
}

impl InMemoryTicketLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketLinkStore for InMemoryTicketLinkStore {
    fn find_by_finding_id(
        &self,
        finding_id: &FindingId,
    ) -> Result<Option<TicketLink>, DomainError> {
        let links = self
            .links
            .lock()
            .map_err(|e| DomainError::StoreFailed(format!("lock poisoned: {e}")))?;
        Ok(links.get(&finding_id.0).cloned())
    }

    fn save(&self, link: &TicketLink) -> Result<(), DomainError> {
        let mut links = self
            .links
            .lock()
            .map_err(|e| DomainError::StoreFailed(format!("lock poisoned: {e}")))?;
        links.insert(link.finding_id.0.clone(), link.clone());
        Ok(())
    }
}
