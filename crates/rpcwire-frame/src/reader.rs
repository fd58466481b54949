use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::trace;

use crate::codec::{
    decode_length, FrameConfig, LENGTH_PREFIX_SIZE, MAX_FRAME_PAYLOAD, MAX_PREALLOCATION,
};
use crate::error::{FrameError, Result};

/// Read a 4-byte big-endian length prefix.
///
/// Fails with an [`ErrorKind::UnexpectedEof`] I/O error if the stream ends
/// before all four bytes arrive, including when it ends before the first one.
pub fn read_length_prefix<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0usize;
    while filled < LENGTH_PREFIX_SIZE {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => {
                let msg = if filled == 0 {
                    "stream closed before frame length".to_string()
                } else {
                    format!("stream ended after {filled} of {LENGTH_PREFIX_SIZE} length bytes")
                };
                return Err(FrameError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    msg,
                )));
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(decode_length(prefix))
}

/// Read one complete frame with no size limit beyond the 32-bit length field.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Bytes> {
    read_frame_limited(reader, MAX_FRAME_PAYLOAD)
}

/// Read one complete frame, rejecting declared lengths above `max_payload`.
///
/// The payload is only returned once every declared byte has arrived; a short
/// stream yields an [`ErrorKind::UnexpectedEof`] I/O error and the bytes read
/// so far are dropped. Zero-length frames yield an empty buffer.
pub fn read_frame_limited<R: Read + ?Sized>(reader: &mut R, max_payload: usize) -> Result<Bytes> {
    let len = read_length_prefix(reader)? as usize;
    if len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: max_payload,
        });
    }

    let mut payload = Vec::with_capacity(len.min(MAX_PREALLOCATION));
    let mut limited = reader.take(len as u64);
    loop {
        match limited.read_to_end(&mut payload) {
            Ok(_) => break,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    if payload.len() != len {
        return Err(FrameError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!(
                "stream ended after {} of {len} payload bytes",
                payload.len()
            ),
        )));
    }

    trace!(len, "read frame");
    Ok(Bytes::from(payload))
}

/// Reads complete frames from any `Read` stream.
///
/// Reads exactly one frame's bytes per call and never reads ahead, so the
/// stream can be handed to another reader between frames.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    pub fn read_frame(&mut self) -> Result<Bytes> {
        read_frame_limited(&mut self.inner, self.config.max_payload_size)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
