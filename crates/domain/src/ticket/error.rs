use thiserror::Error;

/// Errors talking to the ticket tracker.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("issue creation failed: {0}")]
    CreateFailed(String),

    /// The tracker's create response carried no ticket key. Fatal: a ticket
    /// with no retrievable identity cannot be linked.
    #[error("issue created but response carried no key")]
    MissingKey,

    #[error("fetching transitions failed: {0}")]
    TransitionsFetchFailed(String),

    #[error("applying transition {transition_id} failed: {message}")]
    TransitionApplyFailed {
        transition_id: String,
        message: String,
    },
}
