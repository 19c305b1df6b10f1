use std::future::Future;
use std::pin::Pin;

use domain::common::error::DomainError;
use domain::job::entity::Acknowledgement;

/// Outbound sink for job acknowledgements.
///
/// Delivery is fire-and-forget: the emitter logs failures and never blocks
/// or fails job completion on them.
pub trait AckSink: Send + Sync {
    fn emit<'a>(
        &'a self,
        ack: &'a Acknowledgement,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>>;
}
