use std::future::Future;
use std::pin::Pin;

use domain::common::entity::{Tenant, TicketKey};
use domain::ticket::entity::Transition;
use domain::ticket::error::TicketError;

/// Issue-tracker API: create issues and drive their workflow transitions.
pub trait TicketTrackerApi: Send + Sync {
    /// Create an issue under the tenant's configured project and return the
    /// tracker-assigned human-readable key. Fails if the response carries no
    /// key — a ticket with no retrievable identity cannot be linked.
    fn create_issue<'a>(
        &'a self,
        tenant: &'a Tenant,
        summary: &'a str,
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TicketKey, TicketError>> + Send + 'a>>;

    /// Fetch the ordered sequence of currently legal transitions for a
    /// ticket. Empty means the ticket sits at a terminal workflow node.
    fn list_transitions<'a>(
        &'a self,
        tenant: &'a Tenant,
        ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Transition>, TicketError>> + Send + 'a>>;

    /// Apply one transition by id.
    fn apply_transition<'a>(
        &'a self,
        tenant: &'a Tenant,
        ticket_key: &'a str,
        transition_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TicketError>> + Send + 'a>>;
}
