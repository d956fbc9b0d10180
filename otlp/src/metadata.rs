use std::net::IpAddr;

use apm_model::util::truncate;
use apm_model::ApmEvent;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::attributes::{AttributeValue, Attributes};
use crate::semconv;

pub const AGENT_NAME_JAEGER: &str = "Jaeger";

static SERVICE_NAME_INVALID: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[^a-zA-Z0-9 _-]").expect("hard-coded regular expression to be valid")
});

/// Translates resource attributes into the identity, infrastructure and label fields of
/// `out`.
///
/// Never fails: values of the wrong kind for a recognized key are stored as their empty
/// value and unusable label values are dropped. Required fields are backfilled with
/// defaults, and every label collected here is global.
pub fn translate_resource_metadata(attrs: &Attributes, out: &mut ApmEvent) {
    let mut exporter_version = "";
    for (key, value) in attrs {
        match key.as_str() {
            // service.*
            semconv::SERVICE_NAME => out.service_mut().name = clean_service_name(value.as_str()),
            semconv::SERVICE_VERSION => out.service_mut().version = truncate(value.as_str()),
            semconv::SERVICE_INSTANCE_ID => {
                out.service_mut().node_mut().name = truncate(value.as_str())
            }

            // deployment.*
            semconv::DEPLOYMENT_ENVIRONMENT => {
                out.service_mut().environment = truncate(value.as_str())
            }

            // telemetry.sdk.*
            semconv::TELEMETRY_SDK_NAME => out.agent_mut().name = truncate(value.as_str()),
            semconv::TELEMETRY_SDK_VERSION => out.agent_mut().version = truncate(value.as_str()),
            semconv::TELEMETRY_SDK_LANGUAGE => {
                out.service_mut().language_mut().name = truncate(value.as_str())
            }

            // cloud.*
            semconv::CLOUD_PROVIDER => out.cloud_mut().provider = truncate(value.as_str()),
            semconv::CLOUD_ACCOUNT_ID => out.cloud_mut().account_id = truncate(value.as_str()),
            semconv::CLOUD_REGION => out.cloud_mut().region = truncate(value.as_str()),
            semconv::CLOUD_AVAILABILITY_ZONE => {
                out.cloud_mut().availability_zone = truncate(value.as_str())
            }
            semconv::CLOUD_PLATFORM => out.cloud_mut().service_name = truncate(value.as_str()),

            // container.*
            semconv::CONTAINER_NAME => out.container_mut().name = truncate(value.as_str()),
            semconv::CONTAINER_ID => out.container_mut().id = truncate(value.as_str()),
            semconv::CONTAINER_IMAGE_NAME => {
                out.container_mut().image_name = truncate(value.as_str())
            }
            semconv::CONTAINER_IMAGE_TAG => {
                out.container_mut().image_tag = truncate(value.as_str())
            }
            semconv::CONTAINER_RUNTIME => out.container_mut().runtime = truncate(value.as_str()),

            // k8s.*
            semconv::K8S_NAMESPACE_NAME => {
                out.kubernetes_mut().namespace = truncate(value.as_str())
            }
            semconv::K8S_NODE_NAME => out.kubernetes_mut().node_name = truncate(value.as_str()),
            semconv::K8S_POD_NAME => out.kubernetes_mut().pod_name = truncate(value.as_str()),
            semconv::K8S_POD_UID => out.kubernetes_mut().pod_uid = truncate(value.as_str()),

            // host.*
            semconv::HOST_NAME => out.host_mut().hostname = truncate(value.as_str()),
            semconv::HOST_ID => out.host_mut().id = truncate(value.as_str()),
            semconv::HOST_TYPE => out.host_mut().kind = truncate(value.as_str()),
            semconv::HOST_ARCH => out.host_mut().architecture = truncate(value.as_str()),

            // process.*
            semconv::PROCESS_PID => {
                out.process_mut().pid = u32::try_from(value.as_int()).unwrap_or_default()
            }
            semconv::PROCESS_COMMAND_LINE => {
                out.process_mut().command_line = truncate(value.as_str())
            }
            semconv::PROCESS_EXECUTABLE_PATH => {
                out.process_mut().executable = truncate(value.as_str())
            }
            semconv::PROCESS_RUNTIME_NAME => {
                out.service_mut().runtime_mut().name = truncate(value.as_str())
            }
            semconv::PROCESS_RUNTIME_VERSION => {
                out.service_mut().runtime_mut().version = truncate(value.as_str())
            }

            // os.*
            semconv::OS_TYPE => {
                out.host_mut().os_mut().platform = truncate(value.as_str()).to_lowercase()
            }
            semconv::OS_DESCRIPTION => out.host_mut().os_mut().full = truncate(value.as_str()),
            semconv::OS_NAME => out.host_mut().os_mut().name = truncate(value.as_str()),
            semconv::OS_VERSION => out.host_mut().os_mut().version = truncate(value.as_str()),

            // device.*
            semconv::DEVICE_ID => out.device_mut().id = truncate(value.as_str()),
            semconv::DEVICE_MODEL_IDENTIFIER => {
                out.device_mut().model_mut().identifier = truncate(value.as_str())
            }
            semconv::DEVICE_MODEL_NAME => {
                out.device_mut().model_mut().name = truncate(value.as_str())
            }
            semconv::DEVICE_MANUFACTURER => {
                out.device_mut().manufacturer = truncate(value.as_str())
            }

            semconv::OPENCENSUS_EXPORTER_VERSION => exporter_version = value.as_str(),
            semconv::ELASTIC_EXPORT_TIMESTAMP => {}

            _ => set_label(&replace_dots(key), value, out),
        }
    }

    set_os_type(out);

    if exporter_version.starts_with(AGENT_NAME_JAEGER) {
        translate_jaeger(exporter_version, out);
    }

    if out.service_name().is_empty() {
        out.service_mut().name = "unknown".to_string();
    }
    if out.agent_name().is_empty() {
        out.agent_mut().name = "otlp".to_string();
    }
    if out.agent_version().is_empty() {
        out.agent_mut().version = "unknown".to_string();
    }
    if out.language_name().is_empty() {
        out.service_mut().language_mut().name = "unknown".to_string();
    } else {
        let name = format!("{}/{}", out.agent_name(), out.language_name());
        out.agent_mut().name = name;
    }

    out.labels.mark_all_global();
    out.numeric_labels.mark_all_global();
}

/// Sets `host.os.type` to one of linux, macos, unix, windows, android or ios when the OS
/// platform or name allows it. The name wins over the platform.
fn set_os_type(out: &mut ApmEvent) {
    let from_platform = match out.os_platform() {
        platform @ ("windows" | "linux") => Some(platform.to_string()),
        "darwin" => Some("macos".to_string()),
        "aix" | "hpux" | "solaris" => Some("unix".to_string()),
        _ => None,
    };
    if let Some(kind) = from_platform {
        out.host_mut().os_mut().kind = kind;
    }

    let from_name = match out.os_name() {
        "Android" => Some("android"),
        "iOS" => Some("ios"),
        _ => None,
    };
    if let Some(kind) = from_name {
        out.host_mut().os_mut().kind = kind.to_string();
    }
}

/// Recovers agent details from a `Jaeger-<language>-<version>` exporter version and moves
/// the labels Jaeger clients send into their own fields.
fn translate_jaeger(exporter_version: &str, out: &mut ApmEvent) {
    let parts: Vec<&str> = exporter_version.splitn(3, '-').collect();
    if out.language_name().is_empty() && parts.len() == 3 {
        out.service_mut().language_mut().name = parts[1].to_string();
    }
    if let Some(version) = parts.last().filter(|v| !v.is_empty()) {
        out.agent_mut().version = version.to_string();
    }
    out.agent_mut().name = AGENT_NAME_JAEGER.to_string();

    if let Some(client_uuid) = out.labels.remove("client-uuid") {
        if let Some(id) = client_uuid.scalar() {
            out.agent_mut().ephemeral_id = id.clone();
        }
    }
    if let Some(ip) = out.labels.remove("ip") {
        if let Some(ip) = ip.scalar().and_then(|s| s.parse::<IpAddr>().ok()) {
            out.host_mut().ip = vec![ip.to_string()];
        }
    }
}

fn clean_service_name(name: &str) -> String {
    SERVICE_NAME_INVALID
        .replace_all(&truncate(name), "_")
        .into_owned()
}

/// Label keys cannot hold dots.
pub fn replace_dots(key: &str) -> String {
    key.replace('.', "_")
}

/// Stores `value` as a local label of `event`.
///
/// Strings and booleans become string labels, numbers become numeric labels, and slices take
/// the kind of their first element. Empty slices and slices mixing kinds are dropped.
pub fn set_label(key: &str, value: &AttributeValue, event: &mut ApmEvent) {
    match value {
        AttributeValue::Str(s) => event.labels.set(key, truncate(s)),
        AttributeValue::Bool(b) => event.labels.set(key, b.to_string()),
        AttributeValue::Int(i) => event.numeric_labels.set(key, *i as f64),
        AttributeValue::Double(d) => event.numeric_labels.set(key, *d),
        AttributeValue::Slice(values) => match values.first() {
            Some(AttributeValue::Str(_) | AttributeValue::Bool(_)) => {
                if let Some(values) = values.iter().map(string_label).collect() {
                    event.labels.set_slice(key, values);
                }
            }
            Some(AttributeValue::Int(_) | AttributeValue::Double(_)) => {
                if let Some(values) = values.iter().map(numeric_label).collect() {
                    event.numeric_labels.set_slice(key, values);
                }
            }
            Some(AttributeValue::Slice(_)) | None => {}
        },
    }
}

fn string_label(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Str(s) => Some(truncate(s)),
        AttributeValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn numeric_label(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Int(i) => Some(*i as f64),
        AttributeValue::Double(d) => Some(*d),
        _ => None,
    }
}
