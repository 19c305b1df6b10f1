use std::sync::Arc;

use domain::job::entity::{AckStatus, Acknowledgement};
use ports::secondary::ack_sink::AckSink;

/// Single emission point for job acknowledgements.
///
/// Every job — inbound or synthesized — reports its terminal status through
/// here. Emission is fire-and-forget: sink failures are logged and never
/// block or fail job completion.
pub struct AckEmitter {
    sink: Arc<dyn AckSink>,
}

impl AckEmitter {
    pub fn new(sink: Arc<dyn AckSink>) -> Self {
        Self { sink }
    }

    pub async fn emit(&self, job_id: &str, success: bool) {
        let status = if success {
            AckStatus::Success
        } else {
            AckStatus::Failure
        };
        let ack = Acknowledgement::new(job_id, status);
        if let Err(e) = self.sink.emit(&ack).await {
            tracing::warn!(job_id, error = %e, "acknowledgement delivery failed");
        }
    }
}
