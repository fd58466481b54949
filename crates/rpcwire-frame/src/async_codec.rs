//! `tokio_util::codec` adapter for the same big-endian length-prefixed format.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{checked_len, decode_frame, encode_frame, FrameConfig, MAX_FRAME_PAYLOAD};
use crate::error::{FrameError, Result};

/// Frame codec for `tokio_util::codec::Framed` and friends.
#[derive(Debug, Clone)]
pub struct LengthPrefixCodec {
    max_payload_size: usize,
}

impl LengthPrefixCodec {
    /// Create a codec accepting any payload the length field can describe.
    pub fn new() -> Self {
        Self {
            max_payload_size: MAX_FRAME_PAYLOAD,
        }
    }

    /// Create a codec limited to `config.max_payload_size`.
    pub fn with_config(config: &FrameConfig) -> Self {
        Self {
            max_payload_size: config.max_payload_size,
        }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for LengthPrefixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LengthPrefixCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        decode_frame(src, self.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("stream ended with {} bytes of an incomplete frame", src.len()),
            ))),
        }
    }
}

impl Encoder<Bytes> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        checked_len(item.len(), self.max_payload_size)?;
        encode_frame(&item, dst)
    }
}

impl Encoder<&[u8]> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        checked_len(item.len(), self.max_payload_size)?;
        encode_frame(item, dst)
    }
}
