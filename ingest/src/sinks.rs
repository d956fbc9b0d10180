use apm_model::{Batch, BatchProcessor};
use async_trait::async_trait;
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Logs every event of a batch as JSON.
pub struct PrintProcessor {}

#[async_trait]
impl BatchProcessor for PrintProcessor {
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &mut Batch,
    ) -> anyhow::Result<()> {
        let span = tracing::span!(tracing::Level::INFO, "batch of events");
        let _enter = span.enter();

        histogram!("apm_event_batch_size").record(batch.len() as f64);
        for event in batch.iter() {
            if cancel.is_cancelled() {
                anyhow::bail!("cancelled while printing batch");
            }
            info!("event: {}", serde_json::to_string(event)?);
            counter!("apm_events_processed_total").increment(1);
        }

        Ok(())
    }
}
