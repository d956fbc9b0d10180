pub mod compression;
pub mod error;
pub mod http;
pub mod intake;
pub mod nullable;

pub use compression::gunzip_if_compressed;
pub use error::DecodeError;
pub use http::Headers;
pub use intake::{decode_stream, DecodedStream};
pub use nullable::{
    parse_timestamp, Binding, Nullable, NullableBool, NullableFloat64, NullableHeaders,
    NullableInt, NullableInt64, NullableInterface, NullableString, NullableTimestamp, UnixNanos,
};
