use thiserror::Error;

/// Errors talking to the index store holding canonical finding records.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index search failed: {0}")]
    SearchFailed(String),

    #[error("index update failed: {0}")]
    UpdateFailed(String),
}
