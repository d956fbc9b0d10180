use envconfig::Envconfig;
use tracing::Level;

/// The encoding of the input handed to the ingester.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputFormat {
    /// Intake v2 NDJSON stream.
    Intake,
    /// Protobuf-encoded OTLP `ExportTraceServiceRequest`.
    OtlpProtobuf,
    /// JSON-encoded OTLP `ExportTraceServiceRequest`.
    OtlpJson,
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "intake" => Ok(InputFormat::Intake),
            "otlp" | "otlp-protobuf" => Ok(InputFormat::OtlpProtobuf),
            "otlp-json" => Ok(InputFormat::OtlpJson),
            _ => Err(format!("Unknown input format: {s}")),
        }
    }
}

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "intake")]
    pub input_format: InputFormat,

    // "-" reads stdin
    #[envconfig(default = "-")]
    pub input_path: String,

    #[envconfig(default = "10")]
    pub max_concurrent_batches: usize,

    #[envconfig(default = "info")]
    pub log_level: Level,

    #[envconfig(default = "false")]
    pub log_json: bool,
}
