use std::io::{ErrorKind, Write};

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::codec::{checked_len, encode_frame, encode_length, FrameConfig, MAX_FRAME_PAYLOAD};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Write a 4-byte big-endian length prefix.
pub fn write_length_prefix<W: Write + ?Sized>(writer: &mut W, len: u32) -> Result<()> {
    writer.write_all(&encode_length(len))?;
    Ok(())
}

/// Write one frame: the length prefix, then the payload verbatim.
///
/// The two writes happen back-to-back. The first failure is returned as is;
/// bytes already accepted by the stream are not rolled back.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = checked_len(payload.len(), MAX_FRAME_PAYLOAD)?;
    write_length_prefix(writer, len)?;
    writer.write_all(payload)?;
    trace!(len, "wrote frame");
    Ok(())
}

/// Buffers complete frames and writes them to any `Write` stream on flush.
///
/// Queued frames are only visible to the peer after [`FrameWriter::flush`]
/// returns. Dropping a writer with queued bytes discards them.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append a frame to the outbound buffer without writing it.
    pub fn queue(&mut self, payload: &[u8]) -> Result<()> {
        checked_len(payload.len(), self.config.max_payload_size)?;
        encode_frame(payload, &mut self.buf)
    }

    /// Queue a frame and flush it (blocking).
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.queue(payload)?;
        self.flush()
    }

    /// Write every queued byte to the stream, then flush the stream.
    ///
    /// `Interrupted` writes are resumed. Any other error, including a write
    /// timeout surfacing as `WouldBlock`, is returned and leaves the unsent
    /// bytes in the buffer.
    pub fn flush(&mut self) -> Result<()> {
        while !self.buf.is_empty() {
            match self.inner.write(&self.buf) {
                Ok(0) => {
                    return Err(FrameError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "stream accepted no bytes",
                    )))
                }
                Ok(n) => self.buf.advance(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}

impl<T> FrameWriter<T> {
    /// Number of queued bytes not yet written to the stream.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop every queued byte without writing it.
    pub fn discard(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream, discarding queued bytes.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
