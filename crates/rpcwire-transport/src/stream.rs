use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::close::Close;
use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};

/// A connected wire stream - implements `Read + Write + Close`.
///
/// This is the stream type handed to a message codec once a connection has
/// been established. On Unix it may wrap a Unix domain socket; on every
/// platform it may wrap a TCP connection.
pub struct WireStream {
    inner: WireStreamInner,
}

enum WireStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    Tcp(TcpStream),
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.read(buf),
            WireStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.write(buf),
            WireStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.flush(),
            WireStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl Close for WireStream {
    fn close(&mut self) -> std::io::Result<()> {
        debug!(peer = %self.peer_label(), "closing wire stream");
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
            WireStreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
        }
    }
}

impl From<TcpStream> for WireStream {
    fn from(stream: TcpStream) -> Self {
        Self {
            inner: WireStreamInner::Tcp(stream),
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for WireStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: WireStreamInner::Unix(stream),
        }
    }
}

impl WireStream {
    /// Connect to an endpoint (blocking).
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        let stream = match endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => std::os::unix::net::UnixStream::connect(path)
                .map(Self::from)
                .map_err(|source| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })?,
            #[cfg(not(unix))]
            Endpoint::Unix(_) => return Err(TransportError::Unsupported),
            Endpoint::Tcp(addr) => {
                let stream =
                    TcpStream::connect(addr.as_str()).map_err(|source| TransportError::Connect {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;
                stream.set_nodelay(true)?;
                Self::from(stream)
            }
        };
        debug!(%endpoint, "connected wire stream");
        Ok(stream)
    }

    /// Create a connected pair of Unix domain streams.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        Ok((Self::from(left), Self::from(right)))
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            WireStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            WireStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => Ok(Self::from(stream.try_clone()?)),
            WireStreamInner::Tcp(stream) => Ok(Self::from(stream.try_clone()?)),
        }
    }

    /// Human-readable identity of the remote end, for logs and CLI output.
    pub fn peer_label(&self) -> String {
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => match stream.peer_addr() {
                Ok(addr) => match addr.as_pathname() {
                    Some(path) => format!("unix:{}", path.display()),
                    None => "unix:<unnamed>".to_string(),
                },
                Err(_) => "unix:<disconnected>".to_string(),
            },
            WireStreamInner::Tcp(stream) => match stream.peer_addr() {
                Ok(addr) => format!("tcp:{addr}"),
                Err(_) => "tcp:<disconnected>".to_string(),
            },
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            WireStreamInner::Unix(_) => "unix-domain-socket",
            WireStreamInner::Tcp(_) => "tcp",
        }
    }
}

impl std::fmt::Debug for WireStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
