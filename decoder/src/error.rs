use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to decode request: {0}")]
    RequestDecodingError(String),
    #[error("request holds no event")]
    EmptyPayload,
    #[error("line {line}: first line must hold a metadata object")]
    MissingMetadata { line: usize },
    #[error("line {line}: unknown event type {kind:?}")]
    UnknownEventType { line: usize, kind: String },
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: failed to decode {path}: {source}")]
    InvalidEvent {
        line: usize,
        kind: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input for HTTP headers: {0}")]
    InvalidHeaders(String),
}
