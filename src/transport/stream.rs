//! Byte-stream abstraction for session connections
//!
//! The protocol runs over any blocking byte stream; TCP and UNIX-domain
//! sockets are provided. Accepting connections and choosing the transport
//! belongs to the caller.

use std::io::{self, Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

/// Blocking byte stream a session connection runs over
///
/// The read timeout backs the transport's wait-for-message semantics: a
/// `None` duration means wait forever.
pub trait SessionStream: Read + Write {
    /// Set or clear the read timeout on the underlying descriptor
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl SessionStream for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl SessionStream for UnixStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }
}
