use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::labels::{Labels, NumericLabels};
use crate::processor::Processor;
use crate::url::Url;

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

/// The canonical event every input format is normalized into.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ApmEvent {
    /// Nanoseconds since the Unix epoch.
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<Processor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<Kubernetes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metricset: Option<Metricset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<Http>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(skip_serializing_if = "NumericLabels::is_empty")]
    pub numeric_labels: NumericLabels,
}

impl ApmEvent {
    pub fn service_mut(&mut self) -> &mut Service {
        self.service.get_or_insert_with(Default::default)
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        self.agent.get_or_insert_with(Default::default)
    }

    pub fn cloud_mut(&mut self) -> &mut Cloud {
        self.cloud.get_or_insert_with(Default::default)
    }

    pub fn host_mut(&mut self) -> &mut Host {
        self.host.get_or_insert_with(Default::default)
    }

    pub fn kubernetes_mut(&mut self) -> &mut Kubernetes {
        self.kubernetes.get_or_insert_with(Default::default)
    }

    pub fn container_mut(&mut self) -> &mut Container {
        self.container.get_or_insert_with(Default::default)
    }

    pub fn device_mut(&mut self) -> &mut Device {
        self.device.get_or_insert_with(Default::default)
    }

    pub fn process_mut(&mut self) -> &mut Process {
        self.process.get_or_insert_with(Default::default)
    }

    pub fn trace_mut(&mut self) -> &mut Trace {
        self.trace.get_or_insert_with(Default::default)
    }

    pub fn transaction_mut(&mut self) -> &mut Transaction {
        self.transaction.get_or_insert_with(Default::default)
    }

    pub fn span_mut(&mut self) -> &mut Span {
        self.span.get_or_insert_with(Default::default)
    }

    pub fn error_mut(&mut self) -> &mut Error {
        self.error.get_or_insert_with(Default::default)
    }

    pub fn metricset_mut(&mut self) -> &mut Metricset {
        self.metricset.get_or_insert_with(Default::default)
    }

    pub fn event_mut(&mut self) -> &mut Event {
        self.event.get_or_insert_with(Default::default)
    }

    pub fn http_mut(&mut self) -> &mut Http {
        self.http.get_or_insert_with(Default::default)
    }

    pub fn service_name(&self) -> &str {
        self.service.as_ref().map_or("", |s| s.name.as_str())
    }

    pub fn language_name(&self) -> &str {
        self.service
            .as_ref()
            .and_then(|s| s.language.as_ref())
            .map_or("", |l| l.name.as_str())
    }

    pub fn agent_name(&self) -> &str {
        self.agent.as_ref().map_or("", |a| a.name.as_str())
    }

    pub fn agent_version(&self) -> &str {
        self.agent.as_ref().map_or("", |a| a.version.as_str())
    }

    pub fn os_platform(&self) -> &str {
        self.host
            .as_ref()
            .and_then(|h| h.os.as_ref())
            .map_or("", |os| os.platform.as_str())
    }

    pub fn os_name(&self) -> &str {
        self.host
            .as_ref()
            .and_then(|h| h.os.as_ref())
            .map_or("", |os| os.name.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<ServiceNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Runtime>,
}

impl Service {
    pub fn node_mut(&mut self) -> &mut ServiceNode {
        self.node.get_or_insert_with(Default::default)
    }

    pub fn language_mut(&mut self) -> &mut Language {
        self.language.get_or_insert_with(Default::default)
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        self.runtime.get_or_insert_with(Default::default)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceNode {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Language {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Runtime {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Agent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ephemeral_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Cloud {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub availability_zone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Host {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub architecture: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
}

impl Host {
    pub fn os_mut(&mut self) -> &mut Os {
        self.os.get_or_insert_with(Default::default)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Os {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub platform: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Kubernetes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod_uid: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Container {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub runtime: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_tag: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Device {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<DeviceModel>,
}

impl Device {
    pub fn model_mut(&mut self) -> &mut DeviceModel {
        self.model.get_or_insert_with(Default::default)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceModel {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub identifier: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Process {
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub pid: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command_line: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub executable: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transaction_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Error {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub culprit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<Exception>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<ErrorLog>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Exception {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLog {
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metricset {
    pub samples: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Duration in nanoseconds.
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub duration: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub outcome: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Http {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpResponse>,
}

impl Http {
    pub fn request_mut(&mut self) -> &mut HttpRequest {
        self.request.get_or_insert_with(Default::default)
    }

    pub fn response_mut(&mut self) -> &mut HttpResponse {
        self.response.get_or_insert_with(Default::default)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HttpRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HttpResponse {
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub status_code: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn empty_event_serializes_to_empty_object() {
        let event = ApmEvent::default();
        assert_json_eq!(serde_json::to_value(&event).unwrap(), json!({}));
    }

    #[test]
    fn accessors_create_sub_records_on_demand() {
        let mut event = ApmEvent::default();
        assert_eq!(event.os_platform(), "");
        event.host_mut().os_mut().platform = "linux".to_string();
        event.service_mut().language_mut().name = "go".to_string();
        assert_eq!(event.os_platform(), "linux");
        assert_eq!(event.language_name(), "go");

        assert_json_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "host": {"os": {"platform": "linux"}},
                "service": {"language": {"name": "go"}},
            })
        );
    }
}
