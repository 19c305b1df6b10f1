use std::future::Future;
use std::pin::Pin;

use domain::common::entity::{FindingId, ToolType};
use domain::finding::entity::{CanonicalState, Finding};
use domain::finding::error::IndexError;

/// Search/document store holding the canonical finding records.
///
/// The engine reads and partially updates findings (state, linked ticket id)
/// but never deletes them.
pub trait FindingIndex: Send + Sync {
    /// Set the canonical state of the finding(s) matching an alert number
    /// (query-by-term partial update).
    fn update_state<'a>(
        &'a self,
        index: &'a str,
        alert_number: u64,
        state: CanonicalState,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>>;

    /// Resolve the index document id of the finding with the given alert
    /// number and tool type. `None` when no document matches.
    fn find_doc_id<'a>(
        &'a self,
        index: &'a str,
        alert_number: u64,
        tool_type: ToolType,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FindingId>, IndexError>> + Send + 'a>>;

    /// Batch-fetch findings by document id. Unknown ids are simply absent
    /// from the result.
    fn fetch_by_ids<'a>(
        &'a self,
        index: &'a str,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Finding>, IndexError>> + Send + 'a>>;

    /// Partial update of a single document: set its `ticketId` field.
    fn set_ticket_id<'a>(
        &'a self,
        index: &'a str,
        finding_id: &'a FindingId,
        ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>>;
}
