use std::net::{TcpListener, ToSocketAddrs};
#[cfg(unix)]
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::stream::WireStream;

/// The accepting side of a wire endpoint.
///
/// Unix socket files are created with mode `0600`, a stale socket at the same
/// path is replaced, and the file is removed again when the listener drops
/// (unless something else has taken over the path in the meantime).
pub struct WireListener {
    inner: ListenerInner,
}

enum ListenerInner {
    #[cfg(unix)]
    Unix(UnixSocketListener),
    Tcp(TcpListener),
}

impl WireListener {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Bind to an endpoint and start listening.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let inner = match endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                ListenerInner::Unix(UnixSocketListener::bind(path, Self::DEFAULT_SOCKET_MODE)?)
            }
            #[cfg(not(unix))]
            Endpoint::Unix(_) => return Err(TransportError::Unsupported),
            Endpoint::Tcp(addr) => ListenerInner::Tcp(bind_tcp(addr)?),
        };
        info!(%endpoint, "listening");
        Ok(Self { inner })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        let stream = match &self.inner {
            #[cfg(unix)]
            ListenerInner::Unix(listener) => {
                let (stream, _addr) = listener.listener.accept().map_err(TransportError::Accept)?;
                WireStream::from(stream)
            }
            ListenerInner::Tcp(listener) => {
                let (stream, _addr) = listener.accept().map_err(TransportError::Accept)?;
                stream.set_nodelay(true)?;
                WireStream::from(stream)
            }
        };
        debug!(peer = %stream.peer_label(), "accepted connection");
        Ok(stream)
    }

    /// The endpoint actually bound (resolves TCP port 0 to the assigned port).
    pub fn local_endpoint(&self) -> Result<Endpoint> {
        match &self.inner {
            #[cfg(unix)]
            ListenerInner::Unix(listener) => Ok(Endpoint::Unix(listener.path.clone())),
            ListenerInner::Tcp(listener) => Ok(Endpoint::Tcp(listener.local_addr()?.to_string())),
        }
    }
}

impl std::fmt::Debug for WireListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            #[cfg(unix)]
            ListenerInner::Unix(_) => "unix",
            ListenerInner::Tcp(_) => "tcp",
        };
        f.debug_struct("WireListener").field("type", &kind).finish()
    }
}

fn bind_tcp(addr: &str) -> Result<TcpListener> {
    let bind_err = |source| TransportError::Bind {
        endpoint: format!("tcp:{addr}"),
        source,
    };
    let resolved = addr
        .to_socket_addrs()
        .map_err(bind_err)?
        .collect::<Vec<_>>();
    TcpListener::bind(resolved.as_slice()).map_err(bind_err)
}

#[cfg(unix)]
struct UnixSocketListener {
    listener: std::os::unix::net::UnixListener,
    path: PathBuf,
    /// `(dev, ino)` of the socket file this listener created.
    identity: (u64, u64),
}

#[cfg(unix)]
impl UnixSocketListener {
    /// `sockaddr_un.sun_path` is 108 bytes on Linux, 104 elsewhere.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    fn bind(path: &Path, mode: u32) -> Result<Self> {
        use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path: path.to_path_buf(),
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        let bind_err = |source| TransportError::Bind {
            endpoint: format!("unix:{}", path.display()),
            source,
        };

        // Only ever replace a leftover socket, never a regular file.
        if let Ok(existing) = std::fs::symlink_metadata(path) {
            if !existing.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(path).map_err(bind_err)?;
        }

        let listener = std::os::unix::net::UnixListener::bind(path).map_err(bind_err)?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(bind_err)?;
        let created = std::fs::symlink_metadata(path).map_err(bind_err)?;

        Ok(Self {
            listener,
            path: path.to_path_buf(),
            identity: (created.dev(), created.ino()),
        })
    }
}

#[cfg(unix)]
impl Drop for UnixSocketListener {
    fn drop(&mut self) {
        use std::os::unix::fs::{FileTypeExt, MetadataExt};

        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        let same_file = metadata.file_type().is_socket()
            && (metadata.dev(), metadata.ino()) == self.identity;
        if same_file {
            debug!(path = ?self.path, "removing socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path was replaced; leaving it in place");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[cfg(unix)]
    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rpcwire-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    #[cfg(unix)]
    fn unix_bind_accept_connect() {
        let dir = temp_dir("listener-unix");
        let endpoint = Endpoint::Unix(dir.join("wire.sock"));

        let listener = WireListener::bind(&endpoint).unwrap();
        let client_endpoint = endpoint.clone();
        let client = std::thread::spawn(move || {
            let mut stream = WireStream::connect(&client_endpoint).unwrap();
            stream.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        client.join().unwrap();

        assert_eq!(listener.local_endpoint().unwrap(), endpoint);
        drop(listener);
        assert!(!dir.join("wire.sock").exists(), "socket file removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn unix_socket_mode_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("listener-mode");
        let path = dir.join("mode.sock");
        let listener = WireListener::bind(&Endpoint::Unix(path.clone())).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, WireListener::DEFAULT_SOCKET_MODE);

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn unix_bind_refuses_regular_file() {
        let dir = temp_dir("listener-file");
        let path = dir.join("plain.sock");
        std::fs::write(&path, b"not a socket").unwrap();

        let err = WireListener::bind(&Endpoint::Unix(path.clone())).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn unix_path_too_long() {
        let path = PathBuf::from(format!("/tmp/{}.sock", "a".repeat(200)));
        let err = WireListener::bind(&Endpoint::Unix(path)).unwrap_err();
        assert!(matches!(err, TransportError::PathTooLong { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn drop_keeps_replaced_path() {
        let dir = temp_dir("listener-replaced");
        let path = dir.join("replaced.sock");
        let listener = WireListener::bind(&Endpoint::Unix(path.clone())).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::write(&path, b"someone else").unwrap();
        drop(listener);

        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn tcp_port_zero_reports_assigned_port() {
        let listener = WireListener::bind(&Endpoint::Tcp("127.0.0.1:0".to_string())).unwrap();
        let endpoint = listener.local_endpoint().unwrap();

        let Endpoint::Tcp(addr) = &endpoint else {
            panic!("expected tcp endpoint, got {endpoint:?}");
        };
        assert!(!addr.ends_with(":0"));

        let client_endpoint = endpoint.clone();
        let client = std::thread::spawn(move || {
            let mut stream = WireStream::connect(&client_endpoint).unwrap();
            stream.write_all(b"tcp").unwrap();
        });
        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 3];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"tcp");
        client.join().unwrap();
    }
}
