use domain::common::entity::{Tenant, TenantId};
use domain::common::error::DomainError;

/// Read-only access to tenant configuration, owned by an external store.
pub trait TenantStore: Send + Sync {
    fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError>;
}
