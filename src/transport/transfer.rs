//! Bulk trace-data transfer
//!
//! The client streams its capture as SEND_DATA chunks, closes the stream
//! with FIN_DATA, and eventually ends the session with CLOSE. The server
//! appends chunk payloads to a sink until FIN_DATA, then keeps draining
//! control messages until CLOSE arrives or the caller marks the connection
//! done.

use std::io::Write;

use bytes::Bytes;
use tracing::warn;

use crate::protocol::{Command, Error, MSG_MAX_DATA_LEN, Message, Result};

use super::connection::{Connection, Role};
use super::stream::SessionStream;

impl<S: SessionStream> Connection<S> {
    /// Client: stream `data` as a sequence of SEND_DATA messages
    ///
    /// Full chunks carry [`MSG_MAX_DATA_LEN`] bytes; the final short chunk
    /// declares exactly its own length. Empty input sends nothing.
    pub fn send_data(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let take = data.len().min(MSG_MAX_DATA_LEN);
            let chunk = Bytes::copy_from_slice(&data[..take]);
            self.send(&Message::send_data(chunk))?;
            data = &data[take..];
        }
        Ok(())
    }

    /// Client: signal end-of-stream after the last data chunk
    pub fn finish_data(&mut self) -> Result<()> {
        self.send(&Message::fin_data())
    }

    /// Server: collect the client's data stream into `sink`
    ///
    /// Phase one receives with the configured timeout, appending each
    /// SEND_DATA payload verbatim until FIN_DATA. Phase two drains further
    /// messages without a timeout until CLOSE arrives or [`set_done`] has
    /// been called, so connection-level control traffic after the data
    /// stream still gets handled. Any other command in either phase fails
    /// the collection.
    ///
    /// [`set_done`]: Connection::set_done
    pub fn collect_data<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        debug_assert_eq!(self.role(), Role::Server);

        loop {
            let msg = match self.recv_wait() {
                Ok(msg) => msg,
                Err(err) => {
                    if !matches!(err, Error::Timeout) {
                        warn!(%err, "reading client");
                    }
                    return Err(err);
                }
            };

            match msg.command() {
                Command::FinData => break,
                Command::SendData => sink.write_all(msg.payload())?,
                cmd => {
                    warn!(cmd = %cmd, size = msg.header().size(), "rejecting message");
                    return Err(Error::UnexpectedCommand { cmd });
                }
            }
        }

        // wait for the client's closing handshake
        while !self.is_done() {
            let msg = match self.recv() {
                Ok(msg) => msg,
                Err(err) => {
                    warn!(%err, "reading client");
                    return Err(err);
                }
            };

            match msg.command() {
                Command::Close => break,
                cmd => {
                    warn!(cmd = %cmd, size = msg.header().size(), "rejecting message");
                    return Err(Error::UnexpectedCommand { cmd });
                }
            }
        }

        Ok(())
    }
}
