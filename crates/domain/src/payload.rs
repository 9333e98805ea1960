//! Decoders for the time authority's payloads.
//!
//! Each decoder takes an untyped JSON value and either returns the typed
//! payload or a [`DecodeError`] naming the first field that failed.

use serde_json::{Map, Value};

use crate::error::{DecodeError, DecodeResult};
use crate::time::{CanonicalTime, WatcherCount};

/// Body of the `/api/status` baseline response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPayload {
    /// The authority's current time (`currentTick`).
    pub current_tick: CanonicalTime,
    /// The authority's running count (`currentCount`).
    pub current_count: u64,
}

/// Payload of the pushed `tick` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPayload {
    /// New canonical time.
    pub time: CanonicalTime,
    /// Number of connected watchers.
    pub watchers: WatcherCount,
}

/// Payload of the legacy `count` event. Decoded for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPayload {
    /// The authority's running count.
    pub count: u64,
    /// Number of connected watchers.
    pub watchers: WatcherCount,
}

/// Decodes the baseline status response.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the value is not `{ currentTick, currentCount }`.
pub fn decode_status(value: &Value) -> DecodeResult<StatusPayload> {
    let obj = as_object(value)?;
    Ok(StatusPayload {
        current_tick: timestamp_field(obj, "currentTick")?,
        current_count: count_field(obj, "currentCount")?,
    })
}

/// Decodes a `tick` event payload.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the value is not `{ time, watchers }`.
pub fn decode_tick(value: &Value) -> DecodeResult<TickPayload> {
    let obj = as_object(value)?;
    Ok(TickPayload {
        time: timestamp_field(obj, "time")?,
        watchers: WatcherCount::new(count_field(obj, "watchers")?),
    })
}

/// Decodes a `count` event payload.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the value is not `{ count, watchers }`.
pub fn decode_count(value: &Value) -> DecodeResult<CountPayload> {
    let obj = as_object(value)?;
    Ok(CountPayload {
        count: count_field(obj, "count")?,
        watchers: WatcherCount::new(count_field(obj, "watchers")?),
    })
}

fn as_object(value: &Value) -> DecodeResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(json_type_name(value)))
}

fn timestamp_field(obj: &Map<String, Value>, field: &'static str) -> DecodeResult<CanonicalTime> {
    let raw = obj
        .get(field)
        .ok_or(DecodeError::MissingField(field))?
        .as_str()
        .ok_or(DecodeError::WrongType {
            field,
            expected: "an ISO-8601 string",
        })?;
    CanonicalTime::parse(raw).map_err(|_| DecodeError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    })
}

fn count_field(obj: &Map<String, Value>, field: &'static str) -> DecodeResult<u64> {
    let value = obj.get(field).ok_or(DecodeError::MissingField(field))?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_i64() {
        Some(n) => Err(DecodeError::Negative { field, value: n }),
        None => Err(DecodeError::WrongType {
            field,
            expected: "an integer",
        }),
    }
}

/// Describes the JSON type of `value` for error messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
