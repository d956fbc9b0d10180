use std::sync::Arc;

use apm_model::util::truncate;
use apm_model::{ApmEvent, Batch, BatchProcessor, Processor};
use metrics::{counter, histogram};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::trace::v1::span::SpanKind;
use opentelemetry_proto::tonic::trace::v1::status::StatusCode;
use opentelemetry_proto::tonic::trace::v1::Span;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::attributes::Attributes;
use crate::metadata::{replace_dots, set_label, translate_resource_metadata};

#[derive(Error, Debug)]
pub enum ConsumeError {
    #[error("cancelled while waiting to process the batch")]
    Cancelled,
    #[error("batch semaphore closed")]
    SemaphoreClosed(#[from] AcquireError),
    #[error("failed to process batch: {0}")]
    Processor(#[source] anyhow::Error),
}

pub struct ConsumerConfig {
    /// Receives one batch per consumed request.
    pub processor: Arc<dyn BatchProcessor>,
    /// Bounds the number of batches processed at once.
    pub semaphore: Arc<Semaphore>,
}

/// Translates OTLP data into events and hands them to a batch processor.
pub struct Consumer {
    config: ConsumerConfig,
}

impl Consumer {
    pub fn new(config: ConsumerConfig) -> Self {
        Self { config }
    }

    /// Translates every span of `request` and processes them as one batch.
    ///
    /// Waits for a semaphore permit first; cancellation while waiting aborts without calling
    /// the processor. Processor errors are returned unchanged.
    #[instrument(skip_all, fields(spans = count_spans(request)))]
    pub async fn consume_traces(
        &self,
        cancel: &CancellationToken,
        request: &ExportTraceServiceRequest,
    ) -> Result<(), ConsumeError> {
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ConsumeError::Cancelled),
            permit = self.config.semaphore.acquire() => permit?,
        };

        let mut batch = translate_traces(request);
        counter!("apm_otlp_spans_received").increment(batch.len() as u64);
        histogram!("apm_otlp_batch_size").record(batch.len() as f64);
        debug!(events = batch.len(), "processing OTLP traces");

        self.config
            .processor
            .process_batch(cancel, &mut batch)
            .await
            .map_err(ConsumeError::Processor)
    }
}

fn count_spans(request: &ExportTraceServiceRequest) -> usize {
    request
        .resource_spans
        .iter()
        .flat_map(|rs| &rs.scope_spans)
        .map(|ss| ss.spans.len())
        .sum()
}

/// Translates `request` into a batch with one event per span, in request order.
///
/// Resource attributes are translated once per resource; every span event starts from a copy
/// of its resource event and adds its own attributes as local labels.
pub fn translate_traces(request: &ExportTraceServiceRequest) -> Batch {
    let mut batch = Batch::with_capacity(count_spans(request));
    for rs in &request.resource_spans {
        let attrs = rs
            .resource
            .as_ref()
            .map(|r| Attributes::from_key_values(&r.attributes))
            .unwrap_or_default();
        let mut resource_event = ApmEvent::default();
        translate_resource_metadata(&attrs, &mut resource_event);

        for ss in &rs.scope_spans {
            for span in &ss.spans {
                let mut event = resource_event.clone();
                translate_span(span, &mut event);
                batch.push(event);
            }
        }
    }
    batch
}

fn translate_span(span: &Span, out: &mut ApmEvent) {
    out.timestamp = span.start_time_unix_nano;
    out.trace_mut().id = hex::encode(&span.trace_id);
    out.event_mut().duration = span
        .end_time_unix_nano
        .saturating_sub(span.start_time_unix_nano);
    out.event_mut().outcome = outcome(span).to_string();

    let id = hex::encode(&span.span_id);
    let name = truncate(&span.name);
    if span.parent_span_id.is_empty() {
        out.processor = Some(Processor::transaction());
        let transaction = out.transaction_mut();
        transaction.id = id;
        transaction.name = name;
        transaction.kind = transaction_type(span.kind()).to_string();
        transaction.sampled = Some(true);
    } else {
        out.processor = Some(Processor::span());
        out.parent_id = Some(hex::encode(&span.parent_span_id));
        let event_span = out.span_mut();
        event_span.id = id;
        event_span.name = name;
        event_span.kind = span_type(span.kind()).to_string();
    }

    for (key, value) in &Attributes::from_key_values(&span.attributes) {
        set_label(&replace_dots(key), value, out);
    }
}

fn outcome(span: &Span) -> &'static str {
    match span.status.as_ref().map(|s| s.code()) {
        Some(StatusCode::Ok) => "success",
        Some(StatusCode::Error) => "failure",
        Some(StatusCode::Unset) | None => "unknown",
    }
}

fn transaction_type(kind: SpanKind) -> &'static str {
    match kind {
        SpanKind::Server => "request",
        SpanKind::Consumer => "messaging",
        _ => "unknown",
    }
}

fn span_type(kind: SpanKind) -> &'static str {
    match kind {
        SpanKind::Client => "external",
        SpanKind::Producer => "messaging",
        _ => "app",
    }
}
