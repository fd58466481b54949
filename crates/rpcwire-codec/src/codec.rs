use std::io::{Read, Write};

use rpcwire_frame::{read_frame_limited, FrameConfig, FrameError, FrameWriter};
use rpcwire_transport::{Close, WireStream};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{CodecError, Result};
use crate::header::Header;
use crate::serializer::{AnySerializer, JsonSerializer, Serializer, SerializerKind};

/// When queued messages are written to the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush at the end of every [`MessageCodec::write_message`].
    #[default]
    EachMessage,
    /// Only flush on [`MessageCodec::flush`] or [`MessageCodec::close`].
    Manual,
}

/// Configuration for a message codec.
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    /// Payload limit and stream timeouts for both directions.
    pub frame: FrameConfig,
    /// When queued messages reach the stream.
    pub flush_policy: FlushPolicy,
}

/// The operations an RPC layer needs from a message codec.
pub trait Codec {
    /// Read the next header frame.
    fn read_header(&mut self, header: &mut Header) -> Result<()>;

    /// Read the body frame that follows a header.
    fn read_body<B: DeserializeOwned>(&mut self, body: &mut B) -> Result<()>;

    /// Write one message (header frame, then body frame).
    fn write<B: Serialize + ?Sized>(&mut self, header: &Header, body: &B) -> Result<()>;

    /// Deliver anything still queued and release the stream.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Writes and reads (header, body) messages over one bidirectional stream.
///
/// The codec owns the stream and an outbound buffer. `write_message` encodes
/// both values before queueing either frame, so an encode failure never
/// leaves half a message behind. Queued bytes reach the peer on flush, which
/// happens after every message under [`FlushPolicy::EachMessage`] (the
/// default) and otherwise only on [`flush`](Self::flush) or
/// [`close`](Self::close). Dropping a codec discards unflushed bytes.
///
/// Reads go straight to the stream, one frame at a time, with no read-ahead.
/// Every operation takes `&mut self`; share a codec between threads only
/// behind a lock held for a whole message.
pub struct MessageCodec<S, Z = JsonSerializer> {
    writer: FrameWriter<S>,
    serializer: Z,
    config: CodecConfig,
}

impl<S, Z> MessageCodec<S, Z>
where
    S: Read + Write + Close,
    Z: Serializer,
{
    /// Create a codec with default configuration.
    pub fn new(stream: S, serializer: Z) -> Self {
        Self::with_config(stream, serializer, CodecConfig::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(stream: S, serializer: Z, config: CodecConfig) -> Self {
        Self {
            writer: FrameWriter::with_config(stream, config.frame.clone()),
            serializer,
            config,
        }
    }

    /// Encode `header` and `body` and queue them as two consecutive frames.
    ///
    /// On success the message is queued for delivery; it has reached the
    /// stream only if the flush policy is [`FlushPolicy::EachMessage`].
    pub fn write_message<H, B>(&mut self, header: &H, body: &B) -> Result<()>
    where
        H: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let header_bytes = self.encode(header)?;
        let body_bytes = self.encode(body)?;

        let max = self.config.frame.max_payload_size;
        for len in [header_bytes.len(), body_bytes.len()] {
            if len > max {
                return Err(FrameError::PayloadTooLarge { size: len, max }.into());
            }
        }

        self.writer.queue(&header_bytes)?;
        self.writer.queue(&body_bytes)?;
        debug!(
            serializer = self.serializer.name(),
            header_len = header_bytes.len(),
            body_len = body_bytes.len(),
            "queued message"
        );

        if self.config.flush_policy == FlushPolicy::EachMessage {
            self.flush()?;
        }
        Ok(())
    }

    /// Write every queued byte to the stream.
    pub fn flush(&mut self) -> Result<()> {
        let pending = self.writer.pending();
        if pending == 0 {
            return Ok(());
        }
        self.writer.flush()?;
        trace!(bytes = pending, "flushed");
        Ok(())
    }

    /// Read the next frame and decode it as a header.
    pub fn read_header<H: DeserializeOwned>(&mut self, header: &mut H) -> Result<()> {
        self.read_into(header)
    }

    /// Read the next frame and decode it as a body.
    pub fn read_body<B: DeserializeOwned>(&mut self, body: &mut B) -> Result<()> {
        self.read_into(body)
    }

    /// Read a header and its body in one call.
    pub fn read_message<H, B>(&mut self) -> Result<(H, B)>
    where
        H: DeserializeOwned,
        B: DeserializeOwned,
    {
        let header = self.read_value()?;
        let body = self.read_value()?;
        Ok((header, body))
    }

    /// Consume the next body frame without decoding it.
    ///
    /// Keeps the header/body alternation intact when a header says the body
    /// is of no interest. Returns the skipped payload length.
    pub fn discard_body(&mut self) -> Result<usize> {
        let payload = self.read_payload()?;
        Ok(payload.len())
    }

    /// Flush queued bytes, then close the stream.
    ///
    /// The stream is closed even if the flush fails; the flush error is
    /// reported first.
    pub fn close(mut self) -> Result<()> {
        let flushed = self.flush();
        if flushed.is_err() {
            let dropped = self.writer.discard();
            warn!(bytes = dropped, "closing codec after failed flush; queued bytes lost");
        }
        let closed = self.writer.get_mut().close().map_err(FrameError::from);
        debug!("codec closed");
        flushed?;
        closed?;
        Ok(())
    }

    /// The serializer in use.
    pub fn serializer(&self) -> &Z {
        &self.serializer
    }

    /// Current codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of queued bytes not yet written to the stream.
    pub fn pending(&self) -> usize {
        self.writer.pending()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.writer.get_ref()
    }

    /// Mutably borrow the underlying stream.
    ///
    /// Reading or writing through this reference bypasses framing and will
    /// desynchronize the peer.
    pub fn get_mut(&mut self) -> &mut S {
        self.writer.get_mut()
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.serializer
            .encode(value)
            .map_err(|source| CodecError::Encode {
                serializer: self.serializer.name(),
                source,
            })
    }

    fn read_payload(&mut self) -> Result<bytes::Bytes> {
        let max = self.config.frame.max_payload_size;
        let payload = read_frame_limited(self.writer.get_mut(), max)?;
        trace!(len = payload.len(), "read frame");
        Ok(payload)
    }

    fn read_into<T: DeserializeOwned>(&mut self, dst: &mut T) -> Result<()> {
        let payload = self.read_payload()?;
        self.serializer
            .decode_into(&payload, dst)
            .map_err(|source| CodecError::Decode {
                serializer: self.serializer.name(),
                source,
            })
    }

    fn read_value<T: DeserializeOwned>(&mut self) -> Result<T> {
        let payload = self.read_payload()?;
        self.serializer
            .decode(&payload)
            .map_err(|source| CodecError::Decode {
                serializer: self.serializer.name(),
                source,
            })
    }
}

impl<Z: Serializer> MessageCodec<WireStream, Z> {
    /// Create a codec for a [`WireStream`], applying the configured timeouts.
    pub fn with_config_wire(stream: WireStream, serializer: Z, config: CodecConfig) -> Result<Self> {
        stream.set_read_timeout(config.frame.read_timeout)?;
        stream.set_write_timeout(config.frame.write_timeout)?;
        Ok(Self::with_config(stream, serializer, config))
    }
}

impl<S, Z> Drop for MessageCodec<S, Z> {
    fn drop(&mut self) {
        let pending = self.writer.pending();
        if pending > 0 {
            warn!(bytes = pending, "codec dropped with unflushed messages; discarding");
        }
    }
}

impl<S, Z> std::fmt::Debug for MessageCodec<S, Z>
where
    S: std::fmt::Debug,
    Z: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCodec")
            .field("stream", self.writer.get_ref())
            .field("serializer", &self.serializer)
            .field("pending", &self.writer.pending())
            .field("config", &self.config)
            .finish()
    }
}

impl<S, Z> Codec for MessageCodec<S, Z>
where
    S: Read + Write + Close,
    Z: Serializer,
{
    fn read_header(&mut self, header: &mut Header) -> Result<()> {
        MessageCodec::read_header(self, header)
    }

    fn read_body<B: DeserializeOwned>(&mut self, body: &mut B) -> Result<()> {
        MessageCodec::read_body(self, body)
    }

    fn write<B: Serialize + ?Sized>(&mut self, header: &Header, body: &B) -> Result<()> {
        self.write_message(header, body)
    }

    fn close(self) -> Result<()> {
        MessageCodec::close(self)
    }
}

// Compile-time check that the stock codec satisfies `Codec`.
const _: fn() = || {
    fn assert_codec<C: Codec>() {}
    assert_codec::<MessageCodec<WireStream, JsonSerializer>>();
    assert_codec::<MessageCodec<WireStream, AnySerializer>>();
};

/// Build a codec for `stream` using the serializer named by `kind`.
pub fn new_codec<S>(kind: SerializerKind, stream: S) -> MessageCodec<S, AnySerializer>
where
    S: Read + Write + Close,
{
    MessageCodec::new(stream, AnySerializer::from(kind))
}
