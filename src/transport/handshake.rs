//! TINIT/RINIT handshake
//!
//! The client opens the session with TINIT (CPU count, page size, option
//! list) and expects RINIT with one port per CPU back. The server validates
//! TINIT, applies its options to the connection, and replies. Neither side
//! retries: the caller decides what to do with a failed handshake.

use tracing::{debug, warn};

use crate::protocol::{
    Command, Error, FixedPayload, Message, OptionCommand, OptionRecord, Result, decode_options,
};

use super::connection::{Connection, Role};
use super::stream::SessionStream;

impl<S: SessionStream> Connection<S> {
    /// Client: announce the session and collect the per-CPU port list
    ///
    /// Sends TINIT (with a `UseTcp` option when the flag is set on this
    /// connection), then waits for RINIT. A CLOSE reply, a timeout, any
    /// other command, or a short port array fails the handshake.
    pub fn send_session_init(&mut self) -> Result<Vec<u32>> {
        debug_assert_eq!(self.role(), Role::Client);

        let mut options = Vec::new();
        if self.use_tcp() {
            options.push(OptionRecord::use_tcp());
        }

        let tinit = Message::tinit(self.cpu_count(), self.config().page_size, &options);
        self.send(&tinit)?;

        let reply = self.recv_wait()?;
        match reply.command() {
            Command::Rinit => reply.ports(),
            Command::Close => Err(Error::SessionClosed),
            cmd => Err(Error::UnexpectedCommand { cmd }),
        }
    }

    /// Server: wait for TINIT and return the client's page size
    ///
    /// Stores the announced CPU count on the connection and applies each
    /// option as a side effect. On any validation failure the offending
    /// command and size are logged and the error returned; whether to drop
    /// the connection is the caller's call.
    pub fn initial_setting(&mut self) -> Result<u32> {
        debug_assert_eq!(self.role(), Role::Server);

        let msg = self.recv_wait()?;
        match self.apply_session_init(&msg) {
            Ok(page_size) => Ok(page_size),
            Err(err) => {
                warn!(
                    cmd = msg.header().cmd_raw(),
                    size = msg.header().size(),
                    "rejecting session init"
                );
                Err(err)
            }
        }
    }

    fn apply_session_init(&mut self, msg: &Message) -> Result<u32> {
        let FixedPayload::Tinit {
            cpus,
            page_size,
            opt_num,
        } = *msg.fixed()
        else {
            return Err(Error::UnexpectedCommand { cmd: msg.command() });
        };

        debug!(cpus, page_size, opt_num, "session init");
        if page_size == 0 {
            return Err(Error::InvalidPageSize { page_size });
        }
        self.set_cpu_count(cpus);

        let options = decode_options(
            msg.payload(),
            msg.header().size(),
            msg.header().cmd_size(),
            opt_num,
        )?;
        for opt in options {
            match opt.command() {
                OptionCommand::UseTcp => self.set_use_tcp(true),
            }
        }

        Ok(page_size)
    }

    /// Server: reply with one port per CPU
    pub fn send_port_array(&mut self, ports: &[u32]) -> Result<()> {
        debug_assert_eq!(self.role(), Role::Server);
        self.send(&Message::rinit(ports))
    }
}
