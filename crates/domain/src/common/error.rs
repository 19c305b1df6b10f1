use thiserror::Error;

/// Errors from the persistence collaborators (tenant, link, runbook stores).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("store error: {0}")]
    StoreFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("engine error: {0}")]
    EngineError(String),
}
