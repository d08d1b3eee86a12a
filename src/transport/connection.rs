//! Per-connection session state and framed message exchange

use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::protocol::{
    Error, FixedPayload, HEADER_LEN, Message, MessageHeader, Result,
};

use super::stream::SessionStream;

/// Default wait for an incoming message
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Scratch chunk size for draining claimed-but-unknown fixed-payload bytes
const SCRATCH_LEN: usize = 512;

/// Which end of the session this connection is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Trace producer: initiates the session, streams data
    Client,
    /// Controller: accepts the session, collects data
    Server,
}

/// Session configuration threaded through the transport and handshake
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Trace buffer page size announced in TINIT
    pub page_size: u32,
    /// Debug mode: disables the receive timeout for interactive debugging
    pub debug: bool,
    /// How long to wait for an incoming message before giving up
    pub wait_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            debug: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// One endpoint of a trace session
///
/// Owns the underlying stream exclusively; all operations are blocking and
/// single-threaded. Negotiated state (CPU count, the TCP option) lands here
/// as a side effect of the handshake.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    role: Role,
    config: SessionConfig,
    cpu_count: u32,
    use_tcp: bool,
    done: bool,
}

impl<S: SessionStream> Connection<S> {
    /// Wrap a connected stream as one endpoint of a session
    #[must_use]
    pub fn new(stream: S, role: Role, config: SessionConfig) -> Self {
        Self {
            stream,
            role,
            config,
            cpu_count: 0,
            use_tcp: false,
            done: false,
        }
    }

    /// Client-role connection
    #[must_use]
    pub fn client(stream: S, config: SessionConfig) -> Self {
        Self::new(stream, Role::Client, config)
    }

    /// Server-role connection
    #[must_use]
    pub fn server(stream: S, config: SessionConfig) -> Self {
        Self::new(stream, Role::Server, config)
    }

    /// This endpoint's role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Negotiated CPU count (set by the handshake)
    #[must_use]
    pub const fn cpu_count(&self) -> u32 {
        self.cpu_count
    }

    /// Set the CPU count a client will announce in TINIT
    pub fn set_cpu_count(&mut self, cpus: u32) {
        self.cpu_count = cpus;
    }

    /// Whether the TCP transport option is in effect
    #[must_use]
    pub const fn use_tcp(&self) -> bool {
        self.use_tcp
    }

    /// Request (client) or apply (server) the TCP transport option
    pub fn set_use_tcp(&mut self, use_tcp: bool) {
        self.use_tcp = use_tcp;
    }

    /// Whether the closing handshake has been observed (server role)
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Mark the connection as finished, ending the post-FIN_DATA drain loop
    pub fn set_done(&mut self) {
        self.done = true;
    }

    /// Give back the underlying stream, dropping the session state
    #[must_use]
    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Send one message: header plus fixed payload in one contiguous write,
    /// then the variable payload
    ///
    /// Short writes are retried until the frame is fully on the wire; any
    /// write failure aborts with the underlying error.
    pub fn send(&mut self, message: &Message) -> Result<()> {
        debug!(cmd = %message.command(), size = message.header().size(), "msg send");

        self.stream.write_all(&message.encode_head())?;
        if !message.payload().is_empty() {
            self.stream.write_all(message.payload())?;
        }
        Ok(())
    }

    /// Send CLOSE to terminate the logical session
    pub fn send_close(&mut self) -> Result<()> {
        self.send(&Message::close())
    }

    /// Receive one message, blocking without a timeout
    pub fn recv(&mut self) -> Result<Message> {
        let mut header_buf = [0u8; HEADER_LEN];
        read_full(&mut self.stream, &mut header_buf)?;

        let header = match MessageHeader::from_bytes(&header_buf) {
            Ok(header) => header,
            Err(err) => {
                warn!(%err, "received an invalid message");
                return Err(err);
            }
        };
        let cmd = header.command().ok_or(Error::UnknownCommand {
            cmd: header.cmd_raw(),
        })?;

        debug!(cmd = %cmd, size = header.size(), "msg received");

        // Read the schema-sized prefix of the fixed payload, zero-filled if
        // the peer declared fewer bytes, and drain any excess a newer peer
        // may have declared beyond the schema.
        let cmd_size = header.cmd_size() as usize;
        let take = cmd_size.min(cmd.fixed_len());

        let mut fixed_buf = vec![0u8; cmd.fixed_len()];
        read_full(&mut self.stream, &mut fixed_buf[..take])?;
        self.drain_excess(cmd_size - take)?;
        let fixed = FixedPayload::parse(cmd, &fixed_buf);

        let payload_len = header.size() as usize - HEADER_LEN - cmd_size;
        let payload = if payload_len > 0 {
            let mut buf = Vec::new();
            buf.try_reserve_exact(payload_len)
                .map_err(|_| Error::OutOfMemory { bytes: payload_len })?;
            buf.resize(payload_len, 0);
            read_full(&mut self.stream, &mut buf)?;
            Bytes::from(buf)
        } else {
            Bytes::new()
        };

        Ok(Message::from_parts(header, cmd, fixed, payload))
    }

    /// Receive one message, waiting at most the configured timeout
    ///
    /// The timeout is disabled in debug mode. Expiry is reported as
    /// [`Error::Timeout`], distinct from descriptor failures, and logged.
    pub fn recv_wait(&mut self) -> Result<Message> {
        let timeout = if self.config.debug {
            None
        } else {
            Some(self.config.wait_timeout)
        };

        self.stream.set_read_timeout(timeout)?;
        let received = self.recv();
        let reset = self.stream.set_read_timeout(None);

        if matches!(received, Err(Error::Timeout)) {
            warn!("connection timed out");
        }
        let message = received?;
        reset?;
        Ok(message)
    }

    fn drain_excess(&mut self, mut excess: usize) -> Result<()> {
        let mut scratch = [0u8; SCRATCH_LEN];
        while excess > 0 {
            let n = excess.min(SCRATCH_LEN);
            read_full(&mut self.stream, &mut scratch[..n])?;
            excess -= n;
        }
        Ok(())
    }
}

/// Read exactly `buf.len()` bytes
///
/// A zero-byte read means the peer went away mid-message; interrupted reads
/// are retried; an expired read timeout surfaces as [`Error::Timeout`].
fn read_full<S: Read>(stream: &mut S, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(Error::Disconnected),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(Error::Timeout);
            }
            Err(err) => return Err(Error::Io(err)),
        }
    }
    Ok(())
}
