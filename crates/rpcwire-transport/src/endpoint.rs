use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TransportError;

/// Where a wire stream connects to or listens on.
///
/// Textual forms:
/// - `unix:/run/app.sock` - Unix domain socket path
/// - `tcp:127.0.0.1:7000` - TCP socket address
/// - `/run/app.sock` - bare path, treated as a Unix domain socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp(String),
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if let Some(addr) = s.strip_prefix("tcp:") {
            // host:port, port must be numeric
            match addr.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    return Ok(Self::Tcp(addr.to_string()));
                }
                _ => return Err(TransportError::InvalidEndpoint(s.to_string())),
            }
        }
        if s.is_empty() {
            return Err(TransportError::InvalidEndpoint(s.to_string()));
        }
        Ok(Self::Unix(PathBuf::from(s)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
            Self::Tcp(addr) => write!(f, "tcp:{addr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_forms() {
        assert_eq!(
            "unix:/tmp/a.sock".parse::<Endpoint>().unwrap(),
            Endpoint::Unix(PathBuf::from("/tmp/a.sock"))
        );
        assert_eq!(
            "tcp:127.0.0.1:7000".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("127.0.0.1:7000".to_string())
        );
        assert_eq!(
            "tcp:[::1]:80".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("[::1]:80".to_string())
        );
    }

    #[test]
    fn bare_path_is_unix() {
        assert_eq!(
            "/run/rpc.sock".parse::<Endpoint>().unwrap(),
            Endpoint::Unix(PathBuf::from("/run/rpc.sock"))
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "unix:", "tcp:", "tcp:localhost", "tcp::80", "tcp:host:port"] {
            let err = bad.parse::<Endpoint>().unwrap_err();
            assert!(matches!(err, TransportError::InvalidEndpoint(_)), "{bad}");
        }
    }

    #[test]
    fn display_roundtrips() {
        for text in ["unix:/tmp/x.sock", "tcp:localhost:9000"] {
            let endpoint: Endpoint = text.parse().unwrap();
            assert_eq!(endpoint.to_string(), text);
        }
    }
}
