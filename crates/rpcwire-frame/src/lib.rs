//! Length-prefixed frame primitives for rpcwire.
//!
//! A frame is the atomic wire unit:
//! - A 4-byte big-endian unsigned payload length
//! - Exactly that many payload bytes
//!
//! There is no magic number, version byte or checksum. The declared length
//! always matches the payload that follows; a stream that ends short of it is
//! reported as an I/O error and never yields a partial payload.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::LengthPrefixCodec;
pub use codec::{
    decode_frame, decode_length, encode_frame, encode_length, FrameConfig, LENGTH_PREFIX_SIZE,
    MAX_FRAME_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::{read_frame, read_frame_limited, read_length_prefix, FrameReader};
pub use writer::{write_frame, write_length_prefix, FrameWriter};
