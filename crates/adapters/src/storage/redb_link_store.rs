use std::path::Path;
use std::sync::Mutex;

use domain::common::entity::FindingId;
use domain::common::error::DomainError;
use domain::ticket::entity::TicketLink;
use ports::secondary::ticket_link_store::TicketLinkStore;
use redb::{Database, TableDefinition};

/// redb table: key = finding id, value = JSON-serialized `TicketLink`.
///
/// Keying by finding id makes the at-most-one-link-per-finding invariant
/// structural.
const LINK_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("ticket_links");

/// Persistent ticket-link store backed by redb.
pub struct RedbTicketLinkStore {
    db: Database,
    /// Serialize writes; redb allows one writer at a time anyway, this keeps
    /// the error surface simple.
    write_lock: Mutex<()>,
}

impl RedbTicketLinkStore {
    /// Open (or create) the link database at `path`.
    pub fn open(path: &Path) -> Result<Self, DomainError> {
        let db = Database::create(path)
            .map_err(|e| DomainError::StoreFailed(format!("redb open failed: {e}")))?;

        // Ensure the table exists.
        let txn = db
            .begin_write()
            .map_err(|e| DomainError::StoreFailed(format!("redb txn begin: {e}")))?;
        {
            let _table = txn
                .open_table(LINK_TABLE)
                .map_err(|e| DomainError::StoreFailed(format!("redb table create: {e}")))?;
        }
        txn.commit()
            .map_err(|e| DomainError::StoreFailed(format!("redb commit: {e}")))?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }
}

impl TicketLinkStore for RedbTicketLinkStore {
    fn find_by_finding_id(
        &self,
        finding_id: &FindingId,
    ) -> Result<Option<TicketLink>, DomainError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| DomainError::StoreFailed(format!("redb read begin: {e}")))?;
        let table = txn
            .open_table(LINK_TABLE)
            .map_err(|e| DomainError::StoreFailed(format!("redb table open: {e}")))?;

        let Some(raw) = table
            .get(finding_id.0.as_str())
            .map_err(|e| DomainError::StoreFailed(format!("redb get: {e}")))?
        else {
            return Ok(None);
        };

        let link: TicketLink = serde_json::from_slice(raw.value())
            .map_err(|e| DomainError::StoreFailed(format!("corrupt link record: {e}")))?;
        Ok(Some(link))
    }

    fn save(&self, link: &TicketLink) -> Result<(), DomainError> {
        let _lock = self
            .write_lock
            .lock()
            .map_err(|e| DomainError::StoreFailed(format!("lock poisoned: {e}")))?;

        let raw = serde_json::to_vec(link)
            .map_err(|e| DomainError::StoreFailed(format!("serialize link: {e}")))?;

        let txn = self
            .db
            .begin_write()
            .map_err(|e| DomainError::StoreFailed(format!("redb write begin: {e}")))?;
        {
            let mut table = txn
                .open_table(LINK_TABLE)
                .map_err(|e| DomainError::StoreFailed(format!("redb table open: {e}")))?;
            table
                .insert(link.finding_id.0.as_str(), raw.as_slice())
                .map_err(|e| DomainError::StoreFailed(format!("redb insert: {e}")))?;
        }
        txn.commit()
            .map_err(|e| DomainError::StoreFailed(format!("redb commit: {e}")))?;

        Ok(())
    }
}
