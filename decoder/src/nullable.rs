//! Values that remember whether they were set while decoding.
//!
//! A [`Nullable`] field distinguishes three states: the key was absent, the key was present
//! with an explicit `null`, and the key was present with a value. Only the last one marks the
//! field as set; mapping code checks [`Nullable::is_set`] before touching the event it builds.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, FixedOffset};
use serde::de::{self, Deserialize, Deserializer, Error as _, Visitor};
use serde_json::Value;

use crate::http::{decode_headers, Headers};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Nullable<T> {
    val: T,
    is_set: bool,
}

pub type NullableString = Nullable<String>;
pub type NullableInt = Nullable<i32>;
pub type NullableInt64 = Nullable<i64>;
pub type NullableFloat64 = Nullable<f64>;
pub type NullableBool = Nullable<bool>;
pub type NullableInterface = Nullable<Value>;
pub type NullableTimestamp = Nullable<UnixNanos>;
pub type NullableHeaders = Nullable<Headers>;

impl<T> Nullable<T> {
    /// Sets the value and marks it as set.
    pub fn set(&mut self, val: T) {
        self.val = val;
        self.is_set = true;
    }

    /// True once a value was set, either directly or by decoding a non-null value.
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn val(&self) -> &T {
        &self.val
    }

    pub fn get(&self) -> Option<&T> {
        self.is_set.then_some(&self.val)
    }
}

impl<T: Default> Nullable<T> {
    /// Returns the value to its initial, unset state.
    pub fn reset(&mut self) {
        self.val = T::default();
        self.is_set = false;
    }
}

impl<T: Binding> Nullable<T> {
    /// Decodes the next value from `deserializer` into `self`.
    ///
    /// An explicit null leaves `self` untouched. On error `self` is left untouched as well.
    pub fn decode<'de, D>(&mut self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        if let Some(val) = deserializer.deserialize_option(NullableVisitor::<T>(PhantomData))? {
            self.set(val);
        }
        Ok(())
    }
}

impl<'de, T: Binding + Default> Deserialize<'de> for Nullable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut nullable = Self::default();
        nullable.decode(deserializer)?;
        Ok(nullable)
    }
}

/// The decoding rule for one kind of value held in a [`Nullable`].
///
/// Implementations are only ever handed non-null input.
pub trait Binding: Sized {
    /// Describes the expected input in decode errors.
    const KIND: &'static str;

    fn decode<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

struct NullableVisitor<T>(PhantomData<T>);

impl<'de, T: Binding> Visitor<'de> for NullableVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} or null", T::KIND)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::decode(deserializer).map(Some)
    }
}

impl Binding for String {
    const KIND: &'static str = "a string";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)
    }
}

impl Binding for i32 {
    const KIND: &'static str = "an integer";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer)
    }
}

impl Binding for i64 {
    const KIND: &'static str = "a 64-bit integer";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer)
    }
}

impl Binding for f64 {
    const KIND: &'static str = "a number";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer)
    }
}

impl Binding for bool {
    const KIND: &'static str = "a boolean";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer)
    }
}

impl Binding for Value {
    const KIND: &'static str = "any JSON value";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer)
    }
}

impl Binding for Headers {
    const KIND: &'static str = "an HTTP header object";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Object(object) = Value::deserialize(deserializer)? else {
            return Err(de::Error::custom("invalid input type for HTTP headers"));
        };
        let mut headers = Headers::new();
        decode_headers(&object, &mut headers).map_err(D::Error::custom)?;
        Ok(headers)
    }
}

/// A point in time as nanoseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnixNanos(pub i64);

/// Offset layouts accepted for timestamp strings, in the order they are tried.
#[derive(Clone, Copy, Debug)]
enum TimestampProfile {
    /// `2006-01-02T15:04:05+07:00`, or `Z`.
    ColonOffset,
    /// `2006-01-02T15:04:05+0700`.
    NoColonOffset,
    /// `2006-01-02T15:04:05+07`.
    HourOffset,
}

const TIMESTAMP_PROFILES: [TimestampProfile; 3] = [
    TimestampProfile::ColonOffset,
    TimestampProfile::NoColonOffset,
    TimestampProfile::HourOffset,
];

const NO_COLON_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

impl TimestampProfile {
    fn parse(self, s: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            TimestampProfile::ColonOffset => DateTime::parse_from_rfc3339(s).ok(),
            TimestampProfile::NoColonOffset => DateTime::parse_from_str(s, NO_COLON_FORMAT).ok(),
            TimestampProfile::HourOffset => {
                let offset = s.get(s.len().checked_sub(3)?..)?.as_bytes();
                let is_hour_offset = matches!(offset[0], b'+' | b'-')
                    && offset[1..].iter().all(u8::is_ascii_digit);
                if !is_hour_offset {
                    return None;
                }
                DateTime::parse_from_str(&format!("{s}00"), NO_COLON_FORMAT).ok()
            }
        }
    }
}

/// Parses `s` with the first matching timestamp profile.
pub fn parse_timestamp(s: &str) -> Option<UnixNanos> {
    TIMESTAMP_PROFILES
        .iter()
        .find_map(|profile| profile.parse(s))
        .and_then(|t| t.timestamp_nanos_opt())
        .map(UnixNanos)
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = UnixNanos;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(UnixNanos::KIND)
    }

    fn visit_i64<E: de::Error>(self, micros: i64) -> Result<Self::Value, E> {
        micros
            .checked_mul(1000)
            .map(UnixNanos)
            .ok_or_else(|| E::custom("timestamp out of range"))
    }

    fn visit_u64<E: de::Error>(self, micros: u64) -> Result<Self::Value, E> {
        let micros = i64::try_from(micros).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(micros)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
        parse_timestamp(s).ok_or_else(|| E::custom("failed to parse the provided time string"))
    }
}

impl Binding for UnixNanos {
    const KIND: &'static str = "a timestamp in microseconds since the Unix epoch or an RFC 3339 string";

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}
