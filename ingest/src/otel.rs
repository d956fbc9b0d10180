//! Reading the OTLP trace export request handed to the ingest binary.

use apm_decoder::gunzip_if_compressed;
use bytes::Bytes;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use prost::Message;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::config::InputFormat;
use crate::error::IngestError;

/// Parses the input as one OTLP trace export request in the configured encoding.
/// Gzip is detected from the magic bytes.
#[instrument(skip_all, fields(format = ?format))]
pub fn parse_request(
    input: Bytes,
    format: InputFormat,
) -> Result<ExportTraceServiceRequest, IngestError> {
    let input = gunzip_if_compressed(input)?;
    match format {
        InputFormat::OtlpProtobuf => decode_protobuf(&input),
        InputFormat::OtlpJson => decode_json(&input),
        InputFormat::Intake => Err(IngestError::RequestParsingError(
            "INPUT_FORMAT=intake does not carry an OTLP trace request".to_string(),
        )),
    }
}

fn decode_protobuf(input: &[u8]) -> Result<ExportTraceServiceRequest, IngestError> {
    ExportTraceServiceRequest::decode(input).map_err(|e| {
        warn!("rejecting OTLP protobuf input: {}", e);
        IngestError::RequestParsingError(format!("not an OTLP protobuf trace export: {e}"))
    })
}

fn decode_json(input: &[u8]) -> Result<ExportTraceServiceRequest, IngestError> {
    let mut tree: Value = serde_json::from_slice(input).map_err(|e| {
        warn!("rejecting OTLP JSON input: {}", e);
        IngestError::RequestParsingError(format!("input is not JSON: {e}"))
    })?;
    clear_empty_any_values(&mut tree);
    serde_json::from_value(tree).map_err(|e| {
        warn!("rejecting OTLP JSON input: {}", e);
        IngestError::RequestParsingError(format!("not an OTLP JSON trace export: {e}"))
    })
}

/// Exporters write an unset `AnyValue` as `{}`, which the generated types reject.
/// Every such `value` becomes `null`.
fn clear_empty_any_values(root: &mut Value) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        match node {
            Value::Object(fields) => {
                for (key, field) in fields.iter_mut() {
                    if key == "value" && field.as_object().is_some_and(Map::is_empty) {
                        *field = Value::Null;
                    } else {
                        pending.push(field);
                    }
                }
            }
            Value::Array(items) => pending.extend(items.iter_mut()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apm_decoder::DecodeError;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, KeyValue};
    use opentelemetry_proto::tonic::resource::v1::Resource;
    use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
    use serde_json::json;
    use std::io::Write;

    fn export_request(service: &str, span_names: &[&str]) -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                resource: Some(Resource {
                    attributes: vec![KeyValue {
                        key: "service.name".to_string(),
                        value: Some(AnyValue {
                            value: Some(any_value::Value::StringValue(service.to_string())),
                        }),
                    }],
                    ..Default::default()
                }),
                scope_spans: vec![ScopeSpans {
                    spans: span_names
                        .iter()
                        .map(|name| Span {
                            name: name.to_string(),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    fn gzip(data: &[u8]) -> Bytes {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(data).unwrap();
        Bytes::from(encoder.finish().unwrap())
    }

    #[test]
    fn reads_protobuf_export() {
        let input = Bytes::from(export_request("inventory", &["reserve", "commit"]).encode_to_vec());
        let request = parse_request(input, InputFormat::OtlpProtobuf).unwrap();
        assert_eq!(request, export_request("inventory", &["reserve", "commit"]));
    }

    #[test]
    fn reads_gzipped_json_export() {
        let input = gzip(
            br#"{"resourceSpans":[{"resource":{"attributes":[{"key":"service.name","value":{"stringValue":"inventory"}},{"key":"unset","value":{}}]},"scopeSpans":[{"spans":[{"traceId":"","spanId":"","name":"reserve"}]}]}]}"#,
        );
        let request = parse_request(input, InputFormat::OtlpJson).unwrap();
        let resource_spans = &request.resource_spans[0];
        let attributes = &resource_spans.resource.as_ref().unwrap().attributes;
        assert_eq!(attributes.len(), 2);
        assert!(attributes[1].value.is_none());
        assert_eq!(resource_spans.scope_spans[0].spans[0].name, "reserve");
    }

    #[test]
    fn broken_gzip_is_a_decode_error() {
        let err = parse_request(
            Bytes::from_static(&[0x1f, 0x8b, 8, 0, 0]),
            InputFormat::OtlpProtobuf,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Decode(DecodeError::RequestDecodingError(_))
        ));
    }

    #[test]
    fn garbage_is_rejected_in_either_encoding() {
        for format in [InputFormat::OtlpProtobuf, InputFormat::OtlpJson] {
            let err = parse_request(Bytes::from_static(&[0xff, 0xff, 0xff]), format).unwrap_err();
            assert!(matches!(err, IngestError::RequestParsingError(_)), "{err}");
        }
    }

    #[test]
    fn intake_format_is_not_otlp() {
        let err = parse_request(Bytes::from_static(b"{}"), InputFormat::Intake).unwrap_err();
        assert!(err.to_string().contains("INPUT_FORMAT=intake"));
    }

    #[test]
    fn empty_any_values_are_cleared_at_any_depth() {
        let mut tree = json!({
            "attributes": [
                {"key": "unset", "value": {}},
                {"key": "list", "value": {"arrayValue": {"values": [{}, {"stringValue": "a"}]}}},
                {"key": "nested", "value": {"kvlistValue": {"values": [{"key": "inner", "value": {}}]}}}
            ]
        });
        clear_empty_any_values(&mut tree);
        assert_eq!(tree["attributes"][0]["value"], Value::Null);
        assert_eq!(
            tree["attributes"][1]["value"]["arrayValue"]["values"][1]["stringValue"],
            "a"
        );
        assert_eq!(
            tree["attributes"][2]["value"]["kvlistValue"]["values"][0]["value"],
            Value::Null
        );
    }
}
