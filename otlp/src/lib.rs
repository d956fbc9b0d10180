pub mod attributes;
pub mod consumer;
pub mod metadata;
pub mod semconv;

pub use attributes::{AttributeValue, Attributes};
pub use consumer::{translate_traces, ConsumeError, Consumer, ConsumerConfig};
pub use metadata::{set_label, translate_resource_metadata};
