use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::nullable::{
    NullableBool, NullableFloat64, NullableHeaders, NullableInt, NullableInt64, NullableInterface,
    NullableString, NullableTimestamp,
};

/// Decodes an explicit null object as its default, like an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "null_as_default")]
    pub service: MetadataService,
    #[serde(deserialize_with = "null_as_default")]
    pub process: MetadataProcess,
    pub labels: NullableInterface,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataService {
    pub name: NullableString,
    pub version: NullableString,
    pub environment: NullableString,
    #[serde(deserialize_with = "null_as_default")]
    pub node: MetadataServiceNode,
    #[serde(deserialize_with = "null_as_default")]
    pub language: NameVersion,
    #[serde(deserialize_with = "null_as_default")]
    pub runtime: NameVersion,
    #[serde(deserialize_with = "null_as_default")]
    pub agent: MetadataServiceAgent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataServiceNode {
    pub configured_name: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameVersion {
    pub name: NullableString,
    pub version: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataServiceAgent {
    pub name: NullableString,
    pub version: NullableString,
    pub ephemeral_id: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataProcess {
    pub pid: NullableInt64,
    pub title: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub id: NullableString,
    pub trace_id: NullableString,
    pub parent_id: NullableString,
    pub name: NullableString,
    #[serde(rename = "type")]
    pub kind: NullableString,
    /// Milliseconds.
    pub duration: NullableFloat64,
    pub timestamp: NullableTimestamp,
    pub outcome: NullableString,
    pub sampled: NullableBool,
    #[serde(deserialize_with = "null_as_default")]
    pub context: Context,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Span {
    pub id: NullableString,
    pub trace_id: NullableString,
    pub parent_id: NullableString,
    pub transaction_id: NullableString,
    pub name: NullableString,
    #[serde(rename = "type")]
    pub kind: NullableString,
    /// Milliseconds.
    pub duration: NullableFloat64,
    pub timestamp: NullableTimestamp,
    pub outcome: NullableString,
    #[serde(deserialize_with = "null_as_default")]
    pub context: Context,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Error {
    pub id: NullableString,
    pub trace_id: NullableString,
    pub parent_id: NullableString,
    pub transaction_id: NullableString,
    pub timestamp: NullableTimestamp,
    pub culprit: NullableString,
    #[serde(deserialize_with = "null_as_default")]
    pub exception: Exception,
    #[serde(deserialize_with = "null_as_default")]
    pub log: ErrorLog,
    #[serde(deserialize_with = "null_as_default")]
    pub context: Context,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Exception {
    pub message: NullableString,
    #[serde(rename = "type")]
    pub kind: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorLog {
    pub message: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metricset {
    pub timestamp: NullableTimestamp,
    pub tags: NullableInterface,
    pub samples: Option<BTreeMap<String, MetricsetSample>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetricsetSample {
    pub value: NullableFloat64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Context {
    #[serde(deserialize_with = "null_as_default")]
    pub request: Request,
    #[serde(deserialize_with = "null_as_default")]
    pub response: Response,
    pub tags: NullableInterface,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Request {
    pub method: NullableString,
    #[serde(deserialize_with = "null_as_default")]
    pub url: RequestUrl,
    pub headers: NullableHeaders,
    pub body: NullableInterface,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestUrl {
    pub full: NullableString,
    pub hostname: NullableString,
    pub protocol: NullableString,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Response {
    pub status_code: NullableInt,
    pub headers: NullableHeaders,
}
