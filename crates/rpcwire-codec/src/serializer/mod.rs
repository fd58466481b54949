//! Pluggable value <-> bytes serializers.
//!
//! - [`JsonSerializer`] - `serde_json`, the default
//! - [`MsgPackSerializer`] - MessagePack via `rmp-serde` (feature `msgpack`)
//! - [`AnySerializer`] - one of the above, chosen at runtime by [`SerializerKind`]
//!
//! A serializer works on one complete value per call; it never streams.

mod json;
#[cfg(feature = "msgpack")]
mod msgpack;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub use json::JsonSerializer;
#[cfg(feature = "msgpack")]
pub use msgpack::MsgPackSerializer;

/// Error type produced by serializer implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Turns serde values into bytes and back.
pub trait Serializer {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Encode one value.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, BoxError>;

    /// Decode one value from a complete payload.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, BoxError>;

    /// Decode into a caller-provided destination.
    ///
    /// `dst` is only overwritten when decoding succeeds.
    fn decode_into<T: DeserializeOwned>(&self, bytes: &[u8], dst: &mut T) -> Result<(), BoxError> {
        *dst = self.decode(bytes)?;
        Ok(())
    }
}

impl<Z: Serializer + ?Sized> Serializer for &Z {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, BoxError> {
        (**self).encode(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, BoxError> {
        (**self).decode(bytes)
    }
}

/// The serializers a codec can be built with at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerKind {
    #[default]
    Json,
    #[cfg(feature = "msgpack")]
    MsgPack,
}

impl SerializerKind {
    /// Every kind compiled into this build.
    pub const ALL: &'static [SerializerKind] = &[
        SerializerKind::Json,
        #[cfg(feature = "msgpack")]
        SerializerKind::MsgPack,
    ];

    /// MIME-style content type naming the format.
    pub fn content_type(self) -> &'static str {
        match self {
            SerializerKind::Json => "application/json",
            #[cfg(feature = "msgpack")]
            SerializerKind::MsgPack => "application/msgpack",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SerializerKind::Json => "json",
            #[cfg(feature = "msgpack")]
            SerializerKind::MsgPack => "msgpack",
        }
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SerializerKind {
    type Err = CodecError;

    /// Accepts a short name (`json`) or a content type (`application/json`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "application/x-msgpack" {
            #[cfg(feature = "msgpack")]
            return Ok(SerializerKind::MsgPack);
        }
        SerializerKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted || kind.content_type() == wanted)
            .ok_or_else(|| CodecError::UnknownSerializer(s.to_string()))
    }
}

/// A serializer selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnySerializer {
    Json(JsonSerializer),
    #[cfg(feature = "msgpack")]
    MsgPack(MsgPackSerializer),
}

impl AnySerializer {
    pub fn kind(&self) -> SerializerKind {
        match self {
            AnySerializer::Json(_) => SerializerKind::Json,
            #[cfg(feature = "msgpack")]
            AnySerializer::MsgPack(_) => SerializerKind::MsgPack,
        }
    }
}

impl From<SerializerKind> for AnySerializer {
    fn from(kind: SerializerKind) -> Self {
        match kind {
            SerializerKind::Json => AnySerializer::Json(JsonSerializer),
            #[cfg(feature = "msgpack")]
            SerializerKind::MsgPack => AnySerializer::MsgPack(MsgPackSerializer),
        }
    }
}

impl Serializer for AnySerializer {
    fn name(&self) -> &'static str {
        match self {
            AnySerializer::Json(inner) => inner.name(),
            #[cfg(feature = "msgpack")]
            AnySerializer::MsgPack(inner) => inner.name(),
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, BoxError> {
        match self {
            AnySerializer::Json(inner) => inner.encode(value),
            #[cfg(feature = "msgpack")]
            AnySerializer::MsgPack(inner) => inner.encode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, BoxError> {
        match self {
            AnySerializer::Json(inner) => inner.decode(bytes),
            #[cfg(feature = "msgpack")]
            AnySerializer::MsgPack(inner) => inner.decode(bytes),
        }
    }
}
