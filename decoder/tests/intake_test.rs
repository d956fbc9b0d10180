use anyhow::Result;
use apm_decoder::{decode_stream, DecodeError};
use assert_json_diff::assert_json_include;
use bytes::Bytes;
use serde_json::json;

const STREAM: &str = r#"{"metadata": {"service": {"name": "opbeans", "version": "1.2", "environment": "prod", "language": {"name": "go", "version": "1.22"}, "agent": {"name": "go", "version": "2.5.0"}}, "process": {"pid": 1234, "title": "opbeans"}, "labels": {"team": "obs", "shard": 3}}}
{"transaction": {"id": "945254c567a5417e", "trace_id": "0123456789abcdef0123456789abcdef", "name": "GET /api/orders", "type": "request", "duration": 32.5, "timestamp": "2019-10-21T11:30:44.929+02:00", "outcome": "success", "context": {"request": {"method": "GET", "url": {"full": "http://opbeans:3000/api/orders?limit=10"}}, "response": {"status_code": 200}, "tags": {"team": "checkout"}}}}
{"span": {"id": "0aaaaaaaaaaaaaaa", "transaction_id": "945254c567a5417e", "parent_id": "945254c567a5417e", "name": "SELECT FROM orders", "type": "db", "duration": 3.5, "timestamp": 1571650244929000}}
{"error": {"id": "9876543210abcdef", "timestamp": 1571650244929000, "exception": {"message": "connection refused"}, "context": {"request": {"headers": {"Content-Type": "application/json"}}}}}
{"metricset": {"timestamp": 1571650244929000, "samples": {"go.memstats.heap.sys.bytes": {"value": 6520832.0}}, "tags": {"host": null}}}"#;

#[test]
fn decodes_a_full_stream() -> Result<()> {
    let decoded = decode_stream(Bytes::from_static(STREAM.as_bytes()))?;
    assert!(decoded.errors.is_empty());
    let batch = decoded.batch;
    assert_eq!(batch.len(), 4);

    for event in &batch {
        assert_eq!(event.service_name(), "opbeans");
        assert_eq!(event.process.as_ref().map(|p| p.pid), Some(1234));
    }

    let transaction = serde_json::to_value(&batch[0])?;
    assert_json_include!(
        actual: transaction,
        expected: json!({
            "timestamp": 1_571_650_244_929_000_000_u64,
            "processor": {"name": "transaction", "event": "transaction"},
            "service": {
                "name": "opbeans",
                "version": "1.2",
                "environment": "prod",
                "language": {"name": "go", "version": "1.22"}
            },
            "agent": {"name": "go", "version": "2.5.0"},
            "trace": {"id": "0123456789abcdef0123456789abcdef"},
            "transaction": {"id": "945254c567a5417e", "name": "GET /api/orders", "type": "request"},
            "event": {"duration": 32_500_000_u64, "outcome": "success"},
            "http": {"request": {"method": "GET"}, "response": {"status_code": 200}},
            "url": {
                "full": "http://opbeans:3000/api/orders?limit=10",
                "domain": "opbeans",
                "port": 3000,
                "path": "/api/orders",
                "query": "limit=10"
            },
            "labels": {"team": {"value": "checkout"}},
            "numeric_labels": {"shard": {"value": 3.0, "global": true}}
        })
    );

    let span = &batch[1];
    assert_eq!(span.timestamp, 1_571_650_244_929_000_000);
    assert_eq!(span.parent_id.as_deref(), Some("945254c567a5417e"));
    assert_eq!(span.span.as_ref().map(|s| s.kind.as_str()), Some("db"));
    assert_eq!(span.event.as_ref().map(|e| e.duration), Some(3_500_000));
    // Event-level tags only overlay the events that carry them.
    assert!(span.labels.get("team").is_some_and(|l| l.global));

    let error = serde_json::to_value(&batch[2])?;
    assert_json_include!(
        actual: error,
        expected: json!({
            "error": {"id": "9876543210abcdef", "exception": {"message": "connection refused"}},
            "http": {"request": {"headers": {"Content-Type": ["application/json"]}}}
        })
    );

    let metricset = &batch[3];
    assert_eq!(
        metricset
            .metricset
            .as_ref()
            .and_then(|m| m.samples.get("go.memstats.heap.sys.bytes")),
        Some(&6_520_832.0)
    );
    assert!(metricset.labels.get("host").is_none());
    Ok(())
}

#[test]
fn relative_url_without_hostname_keeps_its_parts() -> Result<()> {
    let stream = [
        r#"{"metadata": {}}"#,
        r#"{"transaction": {"context": {"request": {"url": {"full": "/search?q=shoes#top"}}}}}"#,
    ]
    .join("\n");
    let batch = decode_stream(Bytes::from(stream))?.batch;
    let url = batch[0].url.as_ref().expect("url is mapped");
    assert_eq!(url.original, "/search?q=shoes#top");
    assert_eq!(url.scheme, "http");
    assert_eq!(url.domain, "");
    assert_eq!(url.path, "/search");
    assert_eq!(url.query, "q=shoes");
    assert_eq!(url.fragment, "top");
    Ok(())
}

#[test]
fn invalid_header_value_is_reported() {
    let stream = [
        r#"{"metadata": {"service": {"name": "opbeans"}}}"#,
        r#"{"transaction": {"context": {"request": {"headers": {"X-Count": 1}}}}}"#,
    ]
    .join("\n");
    let decoded = decode_stream(Bytes::from(stream)).unwrap();
    assert!(decoded.batch.is_empty());
    let err = &decoded.errors[0];
    match err {
        DecodeError::InvalidEvent {
            line, kind, path, ..
        } => {
            assert_eq!(*line, 2);
            assert_eq!(*kind, "transaction");
            assert_eq!(path, "transaction.context.request.headers");
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(err.to_string().contains("invalid input for HTTP headers"));
}

#[test]
fn invalid_timestamp_string_is_reported() {
    let stream = [
        r#"{"metadata": {}}"#,
        r#"{"span": {"timestamp": "yesterday"}}"#,
    ]
    .join("\n");
    let decoded = decode_stream(Bytes::from(stream)).unwrap();
    assert_eq!(decoded.errors.len(), 1);
    let message = decoded.errors[0].to_string();
    assert!(message.contains("span.timestamp"), "{message}");
    assert!(message.contains("failed to parse the provided time string"), "{message}");
}
