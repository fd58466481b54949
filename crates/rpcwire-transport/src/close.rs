use std::io;
use std::net::{Shutdown, TcpStream};

/// A byte stream that can be closed explicitly.
///
/// Closing releases the connection for both directions. Calling `close` twice
/// is only meaningful if the implementing stream defines it; socket
/// implementations report `NotConnected` on the second call on most platforms.
pub trait Close {
    /// Close the stream in both directions.
    fn close(&mut self) -> io::Result<()>;
}

impl Close for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Close for std::os::unix::net::UnixStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

impl<T: Close + ?Sized> Close for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Close + ?Sized> Close for &mut T {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
