//! Decoding of the intake v2 newline-delimited event stream.
//!
//! The first line of a stream holds the metadata object shared by every event that follows.
//! Each later line holds exactly one event, keyed by its type:
//!
//! ```text
//! {"metadata": {"service": {"name": "checkout"}}}
//! {"transaction": {"id": "945254c567a5417e", "duration": 32.5}}
//! {"span": {"id": "0aaaaaaaaaaaaaaa", "name": "SELECT"}}
//! ```

mod mapping;
mod model;

use apm_model::{ApmEvent, Batch};
use bytes::Bytes;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::compression::gunzip_if_compressed;
use crate::error::DecodeError;

use mapping::{map_error, map_metadata, map_metricset, map_span, map_transaction};

/// Events decoded from one intake stream, with the lines that were rejected.
#[derive(Debug, Default)]
pub struct DecodedStream {
    pub batch: Batch,
    pub errors: Vec<DecodeError>,
}

/// Decodes a whole intake stream into a batch, one event per non-metadata line.
///
/// The payload is gunzipped when it starts with the gzip magic bytes, whatever the request
/// claims. A line that fails to decode contributes no event and its error is collected;
/// the following lines are still decoded. Only a payload that cannot be read or whose
/// metadata line is missing or invalid fails the whole stream.
#[instrument(skip_all)]
pub fn decode_stream(bytes: Bytes) -> Result<DecodedStream, DecodeError> {
    tracing::debug!(len = bytes.len(), "decoding intake stream");

    let payload = String::from_utf8(gunzip_if_compressed(bytes)?.into()).map_err(|e| {
        tracing::error!("failed to decode body: {}", e);
        DecodeError::RequestDecodingError(String::from("invalid body encoding"))
    })?;

    let mut lines = payload
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((line, first)) = lines.next() else {
        return Err(DecodeError::EmptyPayload);
    };
    let (kind, body) = split_line(line, first)?;
    if kind != "metadata" {
        return Err(DecodeError::MissingMetadata { line });
    }
    let metadata: model::Metadata = decode_event(line, "metadata", body)?;
    let mut base = ApmEvent::default();
    map_metadata(&metadata, &mut base);

    let mut decoded = DecodedStream::default();
    for (line, raw) in lines {
        match decode_line(line, raw, &base) {
            Ok(event) => decoded.batch.push(event),
            Err(err) => {
                tracing::warn!("skipping intake event: {}", err);
                decoded.errors.push(err);
            }
        }
    }

    tracing::debug!(
        events = decoded.batch.len(),
        rejected = decoded.errors.len(),
        "decoded intake stream"
    );
    Ok(decoded)
}

/// Decodes one event line on top of a copy of the metadata event.
fn decode_line(line: usize, raw: &str, base: &ApmEvent) -> Result<ApmEvent, DecodeError> {
    let (kind, body) = split_line(line, raw)?;
    let mut event = base.clone();
    match kind.as_str() {
        "transaction" => {
            let tx: model::Transaction = decode_event(line, "transaction", body)?;
            map_transaction(&tx, &mut event);
        }
        "span" => {
            let span: model::Span = decode_event(line, "span", body)?;
            map_span(&span, &mut event);
        }
        "error" => {
            let error: model::Error = decode_event(line, "error", body)?;
            map_error(&error, &mut event);
        }
        "metricset" => {
            let metricset: model::Metricset = decode_event(line, "metricset", body)?;
            map_metricset(&metricset, &mut event);
        }
        _ => return Err(DecodeError::UnknownEventType { line, kind }),
    }
    counter!("apm_intake_events_decoded", "type" => kind).increment(1);
    Ok(event)
}

/// Splits a line into its event type key and event body.
///
/// Lines go through [`Value`] first so that a repeated key keeps its last value.
fn split_line(line: usize, raw: &str) -> Result<(String, Value), DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| DecodeError::InvalidJson { line, source })?;
    let Value::Object(object) = value else {
        return Err(DecodeError::UnknownEventType {
            line,
            kind: String::new(),
        });
    };
    if object.len() != 1 {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        return Err(DecodeError::UnknownEventType {
            line,
            kind: keys.join(","),
        });
    }
    object
        .into_iter()
        .next()
        .ok_or(DecodeError::UnknownEventType {
            line,
            kind: String::new(),
        })
}

fn decode_event<T: DeserializeOwned>(
    line: usize,
    kind: &'static str,
    body: Value,
) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize(body).map_err(|err| {
        counter!("apm_intake_decode_errors", "type" => kind).increment(1);
        let path = if err.path().iter().next().is_none() {
            kind.to_string()
        } else {
            format!("{kind}.{}", err.path())
        };
        DecodeError::InvalidEvent {
            line,
            kind,
            path,
            source: err.into_inner(),
        }
    })
}
