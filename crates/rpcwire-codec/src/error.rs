use crate::serializer::BoxError;

/// Errors that can occur while writing or reading messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Frame-level error: stream I/O failure, early end of stream, or an
    /// oversized payload.
    #[error("frame error: {0}")]
    Frame(#[from] rpcwire_frame::FrameError),

    /// The value could not be represented by the serializer. No frame was
    /// queued for the message.
    #[error("{serializer} encode failed: {source}")]
    Encode {
        serializer: &'static str,
        #[source]
        source: BoxError,
    },

    /// The payload did not decode into the destination. The frame has been
    /// consumed; the stream should be treated as desynchronized.
    #[error("{serializer} decode failed: {source}")]
    Decode {
        serializer: &'static str,
        #[source]
        source: BoxError,
    },

    /// Failed to configure the underlying transport stream.
    #[error("transport error: {0}")]
    Transport(#[from] rpcwire_transport::TransportError),

    /// The serializer name or content type is not known.
    #[error("unknown serializer {0:?}")]
    UnknownSerializer(String),
}

impl CodecError {
    /// True when the peer went away (as opposed to sending bad data).
    pub fn is_disconnect(&self) -> bool {
        matches!(self, CodecError::Frame(err) if err.is_disconnect())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
