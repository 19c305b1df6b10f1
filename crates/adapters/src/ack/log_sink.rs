use std::future::Future;
use std::pin::Pin;

use domain::common::error::DomainError;
use domain::job::entity::Acknowledgement;
use ports::secondary::ack_sink::AckSink;

/// Acknowledgement sink that logs the serialized ack.
///
/// The queue producer that actually delivers acknowledgements lives outside
/// this repository; this sink is the default wiring for local runs and
/// keeps the emitted JSON observable.
pub struct LogAckSink;

impl AckSink for LogAckSink {
    fn emit<'a>(
        &'a self,
        ack: &'a Acknowledgement,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move {
            let json = serde_json::to_string(ack)
                .map_err(|e| DomainError::EngineError(format!("serialize ack: {e}")))?;
            tracing::info!(
                ack_id = %ack.ack_id,
                job_id = %ack.job_id,
                status = ?ack.status,
                payload = %json,
                "acknowledgement emitted"
            );
            Ok(())
        })
    }
}
