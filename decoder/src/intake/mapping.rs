use apm_model::util::truncate;
use apm_model::{parse_url, ApmEvent, Processor};
use serde_json::Value;
use tracing::debug;

use crate::http::{headers_to_map, normalize_value};
use crate::intake::model;
use crate::nullable::{NullableFloat64, NullableInterface, NullableString, NullableTimestamp};

fn set_str(from: &NullableString, to: &mut String) {
    if let Some(v) = from.get() {
        *to = truncate(v);
    }
}

fn set_timestamp(from: &NullableTimestamp, out: &mut ApmEvent) {
    if let Some(ts) = from.get() {
        // pre-epoch timestamps are not representable on events
        out.timestamp = u64::try_from(ts.0).unwrap_or_default();
    }
}

fn set_duration(from: &NullableFloat64, out: &mut ApmEvent) {
    if let Some(ms) = from.get() {
        out.event_mut().duration = (ms * 1_000_000.0) as u64;
    }
}

fn set_trace_ids(trace_id: &NullableString, parent_id: &NullableString, out: &mut ApmEvent) {
    if let Some(id) = trace_id.get() {
        out.trace_mut().id = truncate(id);
    }
    if let Some(id) = parent_id.get() {
        out.parent_id = Some(truncate(id));
    }
}

/// Adds the entries of a JSON label object to the event: strings and booleans become string
/// labels, numbers become numeric labels. Nulls and nested values are skipped.
fn set_labels(from: &NullableInterface, out: &mut ApmEvent) {
    let Some(value) = from.get() else {
        return;
    };
    let Value::Object(labels) = value else {
        debug!("ignoring labels that are not a JSON object");
        return;
    };
    for (key, value) in labels {
        match value {
            Value::String(s) => out.labels.set(key.as_str(), truncate(s)),
            Value::Bool(b) => out.labels.set(key.as_str(), b.to_string()),
            Value::Number(n) => {
                if let Some(n) = n.as_f64() {
                    out.numeric_labels.set(key.as_str(), n);
                }
            }
            _ => {}
        }
    }
}

fn map_context(from: &model::Context, out: &mut ApmEvent) {
    let request = &from.request;
    if request.method.is_set() {
        set_str(&request.method, &mut out.http_mut().request_mut().method);
    }
    if let Some(headers) = request.headers.get() {
        out.http_mut().request_mut().headers = headers_to_map(headers);
    }
    if let Some(body) = request.body.get() {
        out.http_mut().request_mut().body = Some(normalize_value(body.clone()));
    }
    if let Some(full) = request.url.full.get() {
        let protocol = request.url.protocol.val().trim_end_matches(':');
        out.url = Some(parse_url(full, request.url.hostname.val(), protocol));
    }

    let response = &from.response;
    if let Some(status_code) = response.status_code.get() {
        out.http_mut().response_mut().status_code = u32::try_from(*status_code).unwrap_or_default();
    }
    if let Some(headers) = response.headers.get() {
        out.http_mut().response_mut().headers = headers_to_map(headers);
    }

    set_labels(&from.tags, out);
}

/// Maps stream metadata onto the event every other event in the stream is based on.
/// Metadata labels are defined at the service level and so are marked global.
pub fn map_metadata(from: &model::Metadata, out: &mut ApmEvent) {
    let service = &from.service;
    if service.name.is_set() {
        set_str(&service.name, &mut out.service_mut().name);
    }
    if service.version.is_set() {
        set_str(&service.version, &mut out.service_mut().version);
    }
    if service.environment.is_set() {
        set_str(&service.environment, &mut out.service_mut().environment);
    }
    if service.node.configured_name.is_set() {
        set_str(
            &service.node.configured_name,
            &mut out.service_mut().node_mut().name,
        );
    }
    if service.language.name.is_set() {
        set_str(
            &service.language.name,
            &mut out.service_mut().language_mut().name,
        );
    }
    if service.language.version.is_set() {
        set_str(
            &service.language.version,
            &mut out.service_mut().language_mut().version,
        );
    }
    if service.runtime.name.is_set() {
        set_str(
            &service.runtime.name,
            &mut out.service_mut().runtime_mut().name,
        );
    }
    if service.runtime.version.is_set() {
        set_str(
            &service.runtime.version,
            &mut out.service_mut().runtime_mut().version,
        );
    }
    if service.agent.name.is_set() {
        set_str(&service.agent.name, &mut out.agent_mut().name);
    }
    if service.agent.version.is_set() {
        set_str(&service.agent.version, &mut out.agent_mut().version);
    }
    if service.agent.ephemeral_id.is_set() {
        set_str(
            &service.agent.ephemeral_id,
            &mut out.agent_mut().ephemeral_id,
        );
    }

    if let Some(pid) = from.process.pid.get() {
        if let Ok(pid) = u32::try_from(*pid) {
            out.process_mut().pid = pid;
        }
    }
    if from.process.title.is_set() {
        set_str(&from.process.title, &mut out.process_mut().title);
    }

    set_labels(&from.labels, out);
    out.labels.mark_all_global();
    out.numeric_labels.mark_all_global();
}

pub fn map_transaction(from: &model::Transaction, out: &mut ApmEvent) {
    out.processor = Some(Processor::transaction());
    set_timestamp(&from.timestamp, out);
    set_duration(&from.duration, out);
    set_trace_ids(&from.trace_id, &from.parent_id, out);

    if from.id.is_set() {
        set_str(&from.id, &mut out.transaction_mut().id);
    }
    if from.name.is_set() {
        set_str(&from.name, &mut out.transaction_mut().name);
    }
    if from.kind.is_set() {
        set_str(&from.kind, &mut out.transaction_mut().kind);
    }
    if let Some(sampled) = from.sampled.get() {
        out.transaction_mut().sampled = Some(*sampled);
    }
    if from.outcome.is_set() {
        set_str(&from.outcome, &mut out.event_mut().outcome);
    }

    map_context(&from.context, out);
}

pub fn map_span(from: &model::Span, out: &mut ApmEvent) {
    out.processor = Some(Processor::span());
    set_timestamp(&from.timestamp, out);
    set_duration(&from.duration, out);
    set_trace_ids(&from.trace_id, &from.parent_id, out);

    if from.id.is_set() {
        set_str(&from.id, &mut out.span_mut().id);
    }
    if from.transaction_id.is_set() {
        set_str(&from.transaction_id, &mut out.span_mut().transaction_id);
    }
    if from.name.is_set() {
        set_str(&from.name, &mut out.span_mut().name);
    }
    if from.kind.is_set() {
        set_str(&from.kind, &mut out.span_mut().kind);
    }
    if from.outcome.is_set() {
        set_str(&from.outcome, &mut out.event_mut().outcome);
    }

    map_context(&from.context, out);
}

pub fn map_error(from: &model::Error, out: &mut ApmEvent) {
    out.processor = Some(Processor::error());
    set_timestamp(&from.timestamp, out);
    set_trace_ids(&from.trace_id, &from.parent_id, out);

    if from.id.is_set() {
        set_str(&from.id, &mut out.error_mut().id);
    }
    if from.transaction_id.is_set() {
        set_str(&from.transaction_id, &mut out.transaction_mut().id);
    }
    if from.culprit.is_set() {
        set_str(&from.culprit, &mut out.error_mut().culprit);
    }
    if from.exception.message.is_set() || from.exception.kind.is_set() {
        let exception = out.error_mut().exception.get_or_insert_with(Default::default);
        set_str(&from.exception.message, &mut exception.message);
        set_str(&from.exception.kind, &mut exception.kind);
    }
    if from.log.message.is_set() {
        let log = out.error_mut().log.get_or_insert_with(Default::default);
        set_str(&from.log.message, &mut log.message);
    }

    map_context(&from.context, out);
}

pub fn map_metricset(from: &model::Metricset, out: &mut ApmEvent) {
    out.processor = Some(Processor::metricset());
    set_timestamp(&from.timestamp, out);

    if let Some(samples) = &from.samples {
        let metricset = out.metricset_mut();
        for (name, sample) in samples {
            if let Some(value) = sample.value.get() {
                metricset.samples.insert(truncate(name), *value);
            }
        }
    }

    set_labels(&from.tags, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: serde::de::DeserializeOwned>(v: Value) -> T {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn unset_fields_leave_event_untouched() {
        let mut event = ApmEvent::default();
        event.service_mut().name = "keep".to_string();
        map_metadata(
            &decode(json!({"service": {"name": null, "version": "1.0"}})),
            &mut event,
        );
        assert_eq!(event.service_name(), "keep");
        assert_eq!(event.service.as_ref().unwrap().version, "1.0");
        assert!(event.agent.is_none());
        assert!(event.process.is_none());
    }

    #[test]
    fn null_objects_decode_like_absent_ones() {
        let metadata: model::Metadata = decode(json!({"service": null, "process": null}));
        let mut event = ApmEvent::default();
        map_metadata(&metadata, &mut event);
        assert_eq!(event, ApmEvent::default());
    }

    #[test]
    fn metadata_labels_are_global() {
        let mut event = ApmEvent::default();
        map_metadata(
            &decode(json!({"labels": {"a": "x", "b": true, "c": 2, "d": null}})),
            &mut event,
        );
        assert_eq!(event.labels.len(), 2);
        assert_eq!(
            event.labels.get("b").unwrap().scalar(),
            Some(&"true".to_string())
        );
        assert_eq!(event.numeric_labels.get("c").unwrap().scalar(), Some(&2.0));
        assert!(event.labels.iter().all(|(_, v)| v.global));
        assert!(event.numeric_labels.iter().all(|(_, v)| v.global));
    }

    #[test]
    fn transaction_fields() {
        let mut event = ApmEvent::default();
        map_transaction(
            &decode(json!({
                "id": "tx1",
                "trace_id": "tr1",
                "name": "GET /",
                "type": "request",
                "duration": 1.5,
                "timestamp": 1_000,
                "sampled": false,
                "context": {
                    "request": {
                        "method": "GET",
                        "url": {"full": "/index?a=b", "hostname": "example.com", "protocol": "https:"},
                        "headers": {"Accept": ["text/html"]},
                        "body": {"n": 1}
                    },
                    "response": {"status_code": 200},
                    "tags": {"tier": "web"}
                }
            })),
            &mut event,
        );

        assert!(event.processor.as_ref().unwrap().is_transaction());
        assert_eq!(event.timestamp, 1_000_000);
        assert_eq!(event.event.as_ref().unwrap().duration, 1_500_000);
        assert_eq!(event.trace.as_ref().unwrap().id, "tr1");
        let transaction = event.transaction.as_ref().unwrap();
        assert_eq!(transaction.id, "tx1");
        assert_eq!(transaction.kind, "request");
        assert_eq!(transaction.sampled, Some(false));

        let request = event.http.as_ref().unwrap().request.as_ref().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.body, Some(json!({"n": 1.0})));
        assert_eq!(
            request.headers.as_ref().unwrap().get("Accept"),
            Some(&json!(["text/html"]))
        );
        assert_eq!(
            event.http.as_ref().unwrap().response.as_ref().unwrap().status_code,
            200
        );

        let url = event.url.as_ref().unwrap();
        assert_eq!(url.full, "https://example.com/index?a=b");
        assert_eq!(url.domain, "example.com");

        let tier = event.labels.get("tier").unwrap();
        assert!(!tier.global);
    }

    #[test]
    fn error_exception_and_log() {
        let mut event = ApmEvent::default();
        map_error(
            &decode(json!({
                "id": "e1",
                "transaction_id": "tx1",
                "exception": {"message": "boom", "type": "RuntimeError"},
                "log": {"message": "it broke"}
            })),
            &mut event,
        );
        assert!(event.processor.as_ref().unwrap().is_error());
        let error = event.error.as_ref().unwrap();
        assert_eq!(error.id, "e1");
        assert_eq!(error.exception.as_ref().unwrap().message, "boom");
        assert_eq!(error.exception.as_ref().unwrap().kind, "RuntimeError");
        assert_eq!(error.log.as_ref().unwrap().message, "it broke");
        assert_eq!(event.transaction.as_ref().unwrap().id, "tx1");
        assert!(event.http.is_none());
    }

    #[test]
    fn metricset_samples_skip_unset_values() {
        let mut event = ApmEvent::default();
        map_metricset(
            &decode(json!({
                "samples": {"cpu": {"value": 0.5}, "mem": {"value": null}, "gc": {}},
                "tags": {"host": "a"}
            })),
            &mut event,
        );
        let samples = &event.metricset.as_ref().unwrap().samples;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.get("cpu"), Some(&0.5));
        assert!(event.labels.contains_key("host"));
    }
}
