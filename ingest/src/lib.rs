pub mod config;
pub mod error;
pub mod otel;
pub mod sinks;

use std::sync::Arc;

use apm_decoder::decode_stream;
use apm_model::BatchProcessor;
use apm_otlp::{Consumer, ConsumerConfig};
use bytes::Bytes;
use metrics::counter;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::InputFormat;
use crate::error::IngestError;

/// Decodes `input` as `format` and hands the resulting events to `processor` as one batch.
///
/// Intake lines that fail to decode are logged and left out of the batch.
#[instrument(skip_all, fields(format = ?format, len = input.len()))]
pub async fn ingest(
    input: Bytes,
    format: InputFormat,
    processor: Arc<dyn BatchProcessor>,
    max_concurrent_batches: usize,
    cancel: &CancellationToken,
) -> Result<(), IngestError> {
    if input.is_empty() {
        return Err(IngestError::EmptyPayload);
    }

    match format {
        InputFormat::Intake => {
            let decoded = decode_stream(input)?;
            let mut batch = decoded.batch;
            counter!("apm_ingest_events_total", "format" => "intake").increment(batch.len() as u64);
            if !decoded.errors.is_empty() {
                counter!("apm_ingest_rejected_events_total", "format" => "intake")
                    .increment(decoded.errors.len() as u64);
                for err in &decoded.errors {
                    warn!("rejected intake event: {}", err);
                }
            }
            info!(
                events = batch.len(),
                rejected = decoded.errors.len(),
                "decoded intake stream"
            );
            processor
                .process_batch(cancel, &mut batch)
                .await
                .map_err(IngestError::Processor)
        }
        InputFormat::OtlpProtobuf | InputFormat::OtlpJson => {
            let request = otel::parse_request(input, format)?;
            let consumer = Consumer::new(ConsumerConfig {
                processor,
                semaphore: Arc::new(Semaphore::new(max_concurrent_batches)),
            });
            consumer.consume_traces(cancel, &request).await?;
            counter!("apm_ingest_requests_total", "format" => "otlp").increment(1);
            Ok(())
        }
    }
}
