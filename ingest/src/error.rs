use apm_decoder::DecodeError;
use apm_otlp::ConsumeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("input is empty")]
    EmptyPayload,
    #[error("failed to parse input: {0}")]
    RequestParsingError(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Consume(#[from] ConsumeError),
    #[error("failed to process batch: {0}")]
    Processor(#[source] anyhow::Error),
}
