/*
    codec.rs - Wire encoding for register and map states

    The only place untrusted bytes become CRDT states.
    Responsibilities:
    - Encode/decode register and map states as JSON or bincode
    - Tag map values explicitly so a tombstone never collides with a `T`
      that itself serializes to null
    - Reject malformed input before it can reach a merge function, including
      duplicate map keys and timestamps a local write could not advance past
*/

use super::clock::LogicalTimestamp;
use super::lww_map::MapState;
use super::lww_register::RegisterState;
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::warn;

/// Errors at the serialization boundary
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input could not be turned into a well-formed state
    #[error("Malformed state: {0}")]
    Malformed(String),

    /// A state could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Encoding used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Self-describing JSON
    #[default]
    Json,
    /// Compact bincode
    Binary,
}

/// Tagged form of a map value: `{"present": v}` or `"absent"`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Slot<T> {
    Present(T),
    Absent,
}

impl<T> From<Slot<T>> for Option<T> {
    fn from(slot: Slot<T>) -> Self {
        match slot {
            Slot::Present(value) => Some(value),
            Slot::Absent => None,
        }
    }
}

fn to_bytes<S: Serialize>(value: &S, format: WireFormat) -> CodecResult<Vec<u8>> {
    match format {
        WireFormat::Json => {
            serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
        }
        WireFormat::Binary => {
            bincode::serialize(value).map_err(|e| CodecError::Serialization(e.to_string()))
        }
    }
}

fn from_bytes<D: DeserializeOwned>(bytes: &[u8], format: WireFormat) -> CodecResult<D> {
    let decoded = match format {
        WireFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        WireFormat::Binary => bincode::deserialize(bytes).map_err(|e| e.to_string()),
    };

    decoded.map_err(|e| {
        warn!(?format, error = %e, "rejected malformed state");
        CodecError::Malformed(e)
    })
}

/// Largest timestamp accepted from the wire. A local `set` must be able to
/// step past anything it merges.
const MAX_WIRE_TIMESTAMP: LogicalTimestamp = LogicalTimestamp::MAX - 1;

fn check_state<T>(key: Option<&str>, state: &RegisterState<T>) -> CodecResult<()> {
    let problem = if state.writer_id.is_empty() {
        "empty writerId".to_string()
    } else if state.timestamp > MAX_WIRE_TIMESTAMP {
        format!("timestamp {} out of range", state.timestamp)
    } else {
        return Ok(());
    };

    let msg = match key {
        Some(key) => format!("{} for key {:?}", problem, key),
        None => problem,
    };
    warn!(error = %msg, "rejected malformed state");
    Err(CodecError::Malformed(msg))
}

/// Map as read off the wire; a key appearing twice is an error rather than
/// a silent overwrite
struct WireMap<T>(BTreeMap<String, RegisterState<Slot<T>>>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WireMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WireMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for WireMapVisitor<T> {
            type Value = WireMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from key to register state")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    if entries.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key {:?}", key)));
                    }
                    let state = access.next_value::<RegisterState<Slot<T>>>()?;
                    entries.insert(key, state);
                }
                Ok(WireMap(entries))
            }
        }

        deserializer.deserialize_map(WireMapVisitor(PhantomData))
    }
}

/// Encode a register state
pub fn encode_register<T: Serialize>(
    state: &RegisterState<T>,
    format: WireFormat,
) -> CodecResult<Vec<u8>> {
    to_bytes(state, format)
}

/// Decode and validate a register state
pub fn decode_register<T: DeserializeOwned>(
    bytes: &[u8],
    format: WireFormat,
) -> CodecResult<RegisterState<T>> {
    let state: RegisterState<T> = from_bytes(bytes, format)?;
    check_state(None, &state)?;
    Ok(state)
}

/// Encode a map state, tombstones included
pub fn encode_map<T: Serialize>(state: &MapState<T>, format: WireFormat) -> CodecResult<Vec<u8>> {
    let wire: BTreeMap<&str, RegisterState<Slot<&T>>> = state
        .iter()
        .map(|(key, reg)| {
            let slot = match &reg.value {
                Some(value) => Slot::Present(value),
                None => Slot::Absent,
            };
            (key.as_str(), RegisterState::new(reg.writer_id.clone(), reg.timestamp, slot))
        })
        .collect();

    to_bytes(&wire, format)
}

/// Decode and validate a map state
pub fn decode_map<T: DeserializeOwned>(bytes: &[u8], format: WireFormat) -> CodecResult<MapState<T>> {
    let WireMap(wire) = from_bytes::<WireMap<T>>(bytes, format)?;

    wire.into_iter()
        .map(|(key, reg)| {
            check_state(Some(key.as_str()), &reg)?;
            Ok((key, reg.map_value(Option::<T>::from)))
        })
        .collect()
}
