//! Bidirectional byte streams for rpcwire.
//!
//! The codec layers above only need an ordered, reliable `Read + Write`
//! channel that can be closed explicitly. This crate supplies:
//! - the [`Close`] trait that expresses the explicit close,
//! - [`WireStream`], a connected Unix domain socket or TCP stream,
//! - [`WireListener`], the accepting side for both,
//! - [`Endpoint`], the textual address form used by tools.
//!
//! Connection lifecycle policy (reconnects, pooling) is left to callers.

pub mod close;
pub mod endpoint;
pub mod error;
pub mod listener;
pub mod stream;

pub use close::Close;
pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use listener::WireListener;
pub use stream::WireStream;
