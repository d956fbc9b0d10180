//! Resource attribute keys recognized by the resource translator.

pub const SERVICE_NAME: &str = "service.name";
pub const SERVICE_VERSION: &str = "service.version";
pub const SERVICE_INSTANCE_ID: &str = "service.instance.id";

pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

pub const TELEMETRY_SDK_NAME: &str = "telemetry.sdk.name";
pub const TELEMETRY_SDK_VERSION: &str = "telemetry.sdk.version";
pub const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";

pub const CLOUD_PROVIDER: &str = "cloud.provider";
pub const CLOUD_ACCOUNT_ID: &str = "cloud.account.id";
pub const CLOUD_REGION: &str = "cloud.region";
pub const CLOUD_AVAILABILITY_ZONE: &str = "cloud.availability_zone";
pub const CLOUD_PLATFORM: &str = "cloud.platform";

pub const CONTAINER_NAME: &str = "container.name";
pub const CONTAINER_ID: &str = "container.id";
pub const CONTAINER_IMAGE_NAME: &str = "container.image.name";
pub const CONTAINER_IMAGE_TAG: &str = "container.image.tag";
pub const CONTAINER_RUNTIME: &str = "container.runtime";

pub const K8S_NAMESPACE_NAME: &str = "k8s.namespace.name";
pub const K8S_NODE_NAME: &str = "k8s.node.name";
pub const K8S_POD_NAME: &str = "k8s.pod.name";
pub const K8S_POD_UID: &str = "k8s.pod.uid";

pub const HOST_NAME: &str = "host.name";
pub const HOST_ID: &str = "host.id";
pub const HOST_TYPE: &str = "host.type";
pub const HOST_ARCH: &str = "host.arch";

pub const PROCESS_PID: &str = "process.pid";
pub const PROCESS_COMMAND_LINE: &str = "process.command_line";
pub const PROCESS_EXECUTABLE_PATH: &str = "process.executable.path";
pub const PROCESS_RUNTIME_NAME: &str = "process.runtime.name";
pub const PROCESS_RUNTIME_VERSION: &str = "process.runtime.version";

pub const OS_TYPE: &str = "os.type";
pub const OS_DESCRIPTION: &str = "os.description";
pub const OS_NAME: &str = "os.name";
pub const OS_VERSION: &str = "os.version";

pub const DEVICE_ID: &str = "device.id";
pub const DEVICE_MODEL_IDENTIFIER: &str = "device.model.identifier";
pub const DEVICE_MODEL_NAME: &str = "device.model.name";
pub const DEVICE_MANUFACTURER: &str = "device.manufacturer";

/// Legacy OpenCensus exporter version, e.g. `Jaeger-Go-2.20.0`.
pub const OPENCENSUS_EXPORTER_VERSION: &str = "opencensus.exporterversion";

/// Export time sent by mobile agents to correct clock skew. Never stored.
pub const ELASTIC_EXPORT_TIMESTAMP: &str = "telemetry.sdk.elastic_export_timestamp";
