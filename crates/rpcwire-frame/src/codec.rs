use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix: 4 bytes, big-endian, unsigned.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload the 32-bit length field can describe.
pub const MAX_FRAME_PAYLOAD: usize = u32::MAX as usize;

/// Upper bound on the up-front allocation for a payload; larger frames grow
/// the buffer as bytes actually arrive.
pub(crate) const MAX_PREALLOCATION: usize = 64 * 1024;

/// Encode a payload length as its 4-byte wire form (most significant byte first).
pub fn encode_length(len: u32) -> [u8; LENGTH_PREFIX_SIZE] {
    len.to_be_bytes()
}

/// Decode a 4-byte wire length.
pub fn decode_length(bytes: [u8; LENGTH_PREFIX_SIZE]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────┐
/// │ Length (4B BE)   │ Payload          │
/// │ unsigned         │ (Length bytes)   │
/// └──────────────────┴──────────────────┘
/// ```
///
/// Nothing is appended to `dst` when the payload is rejected.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = checked_len(payload.len(), MAX_FRAME_PAYLOAD)?;
    dst.reserve(LENGTH_PREFIX_SIZE + payload.len());
    dst.put_u32(len);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    prefix.copy_from_slice(&src[..LENGTH_PREFIX_SIZE]);
    let payload_len = decode_length(prefix) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < LENGTH_PREFIX_SIZE + payload_len {
        let missing = LENGTH_PREFIX_SIZE + payload_len - src.len();
        src.reserve(missing.min(MAX_PREALLOCATION));
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Check a payload length against a limit and the 32-bit length field.
pub(crate) fn checked_len(len: usize, max_payload: usize) -> Result<u32> {
    let max = max_payload.min(MAX_FRAME_PAYLOAD);
    if len > max {
        return Err(FrameError::PayloadTooLarge { size: len, max });
    }
    // max <= u32::MAX, so this cannot truncate
    Ok(len as u32)
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: the full 32-bit range.
    pub max_payload_size: usize,
    /// Read timeout applied to streams that support one.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to streams that support one.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_FRAME_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
