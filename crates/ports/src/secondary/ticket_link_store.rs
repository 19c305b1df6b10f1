use domain::common::entity::FindingId;
use domain::common::error::DomainError;
use domain::ticket::entity::TicketLink;

/// Persistence of the finding↔ticket association.
///
/// At most one link per finding id; written once at ticket-creation time.
pub trait TicketLinkStore: Send + Sync {
    fn find_by_finding_id(&self, finding_id: &FindingId) -> Result<Option<TicketLink>, DomainError>;

    fn save(&self, link: &TicketLink) -> Result<(), DomainError>;
}
