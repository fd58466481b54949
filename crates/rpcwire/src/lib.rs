//! Header/body message framing for RPC over byte streams.
//!
//! rpcwire turns a (header, body) pair into two length-prefixed frames on a
//! bidirectional stream and reads them back on the other side.
//!
//! # Crate Structure
//!
//! - [`transport`] - Unix domain socket and TCP streams with explicit close
//! - [`frame`] - 4-byte big-endian length-prefixed frame primitives
//! - [`codec`] - Serializer adapter and the header/body message codec
//!
//! ```no_run
//! use rpcwire::codec::{Header, JsonSerializer, MessageCodec};
//! use rpcwire::transport::{Endpoint, WireStream};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint: Endpoint = "tcp:127.0.0.1:7000".parse()?;
//! let mut codec = MessageCodec::new(WireStream::connect(&endpoint)?, JsonSerializer);
//!
//! codec.write_message(&Header::new("Arith.Add", 1), &(2, 3))?;
//! let (reply, sum): (Header, i64) = codec.read_message()?;
//! assert_eq!(reply.seq, 1);
//! # let _ = sum;
//! codec.close()?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use rpcwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rpcwire_frame::*;
}

/// Re-export codec types.
pub mod codec {
    pub use rpcwire_codec::*;
}
