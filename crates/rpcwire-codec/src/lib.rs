//! Header/body message codec for RPC-style protocols.
//!
//! Every message is exactly two consecutive frames on one stream: the
//! serialized header, then the serialized body. Values are turned into bytes
//! by a pluggable [`Serializer`]; bytes are put on the wire by
//! [`rpcwire_frame`].
//!
//! ```text
//! Message := HeaderFrame BodyFrame
//! Frame   := Length(4 bytes, big-endian, unsigned) Payload(Length bytes)
//! ```
//!
//! There is no marker telling a header frame from a body frame. Readers must
//! call [`MessageCodec::read_header`] and [`MessageCodec::read_body`] strictly
//! alternately; any error leaves the stream in an unknown position and the
//! connection should be discarded.

pub mod codec;
pub mod error;
pub mod header;
pub mod serializer;

pub use codec::{new_codec, Codec, CodecConfig, FlushPolicy, MessageCodec};
pub use error::{CodecError, Result};
pub use header::Header;
#[cfg(feature = "msgpack")]
pub use serializer::MsgPackSerializer;
pub use serializer::{AnySerializer, BoxError, JsonSerializer, Serializer, SerializerKind};
