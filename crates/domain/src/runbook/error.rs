use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunbookError {
    /// The runbook's filter or action blob does not parse. The config is
    /// skipped; other runbooks still evaluate.
    #[error("malformed config for runbook {runbook_id}: {message}")]
    MalformedConfig { runbook_id: String, message: String },

    #[error("runbook store error: {0}")]
    StoreFailed(String),
}
