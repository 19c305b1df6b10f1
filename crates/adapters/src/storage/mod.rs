pub mod memory;
pub mod redb_link_store;

pub use memory::{InMemoryRunbookStore, InMemoryTenantStore, InMemoryTicketLinkStore};
pub use redb_link_store::RedbTicketLinkStore;
