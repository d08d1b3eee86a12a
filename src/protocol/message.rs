//! Session messages
//!
//! A message is a fixed 12-byte header, a command-specific fixed payload
//! (zero bytes for most commands), and an optional variable payload covering
//! the rest of the declared size: option records for TINIT, the port array
//! for RINIT, raw trace bytes for SEND_DATA.

use bytes::Bytes;

use super::options::{OptionRecord, encode_options};
use super::{Command, Error, HEADER_LEN, MSG_MAX_DATA_LEN, MessageHeader, Result};

/// Command-specific fixed payload, keyed by the header's command
///
/// Each shape is an explicit variant with its own big-endian serializer, so
/// decoding never depends on struct layout or host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedPayload {
    /// Commands with no fixed payload (CLOSE, SEND_DATA, FIN_DATA)
    None,
    /// TINIT: session init announced by the client
    Tinit {
        /// Number of CPUs the client will stream from
        cpus: u32,
        /// Client's trace buffer page size
        page_size: u32,
        /// Number of option records in the variable payload
        opt_num: u32,
    },
    /// RINIT: port-assignment reply from the server
    Rinit {
        /// Number of ports in the variable payload
        cpus: u32,
    },
}

impl FixedPayload {
    /// Append the wire encoding (big-endian) to `out`
    fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            Self::None => {}
            Self::Tinit {
                cpus,
                page_size,
                opt_num,
            } => {
                out.extend_from_slice(&cpus.to_be_bytes());
                out.extend_from_slice(&page_size.to_be_bytes());
                out.extend_from_slice(&opt_num.to_be_bytes());
            }
            Self::Rinit { cpus } => out.extend_from_slice(&cpus.to_be_bytes()),
        }
    }

    /// Parse the fixed payload for `cmd` from a schema-sized buffer
    ///
    /// Callers zero-fill `buf` before copying in however many bytes the peer
    /// actually declared, so a short fixed payload parses with zeroed
    /// trailing fields.
    pub(crate) fn parse(cmd: Command, buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), cmd.fixed_len());
        match cmd {
            Command::Tinit => Self::Tinit {
                cpus: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
                page_size: u32::from_be_bytes(buf[4..8].try_into().unwrap()),
                opt_num: u32::from_be_bytes(buf[8..12].try_into().unwrap()),
            },
            Command::Rinit => Self::Rinit {
                cpus: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
            },
            Command::Close | Command::SendData | Command::FinData => Self::None,
        }
    }
}

/// One unit of exchange between the session endpoints
#[derive(Debug, Clone)]
pub struct Message {
    header: MessageHeader,
    cmd: Command,
    fixed: FixedPayload,
    payload: Bytes,
}

impl Message {
    fn build(cmd: Command, fixed: FixedPayload, payload: Bytes) -> Self {
        Self {
            header: MessageHeader::new(cmd, payload.len()),
            cmd,
            fixed,
            payload,
        }
    }

    /// CLOSE: terminate the logical session
    #[must_use]
    pub fn close() -> Self {
        Self::build(Command::Close, FixedPayload::None, Bytes::new())
    }

    /// FIN_DATA: end of the data stream
    #[must_use]
    pub fn fin_data() -> Self {
        Self::build(Command::FinData, FixedPayload::None, Bytes::new())
    }

    /// TINIT with the given option records appended as the variable payload
    #[must_use]
    pub fn tinit(cpus: u32, page_size: u32, options: &[OptionRecord]) -> Self {
        let fixed = FixedPayload::Tinit {
            cpus,
            page_size,
            opt_num: options.len() as u32,
        };
        Self::build(Command::Tinit, fixed, Bytes::from(encode_options(options)))
    }

    /// RINIT carrying one port per CPU
    #[must_use]
    pub fn rinit(ports: &[u32]) -> Self {
        let mut payload = Vec::with_capacity(ports.len() * 4);
        for port in ports {
            payload.extend_from_slice(&port.to_be_bytes());
        }
        Self::build(
            Command::Rinit,
            FixedPayload::Rinit {
                cpus: ports.len() as u32,
            },
            Bytes::from(payload),
        )
    }

    /// SEND_DATA carrying one chunk of raw trace bytes
    ///
    /// The chunk must fit inside a single message; the transfer layer splits
    /// larger buffers.
    #[must_use]
    pub fn send_data(chunk: impl Into<Bytes>) -> Self {
        let chunk = chunk.into();
        debug_assert!(chunk.len() <= MSG_MAX_DATA_LEN, "chunk exceeds one message");
        Self::build(Command::SendData, FixedPayload::None, chunk)
    }

    /// Assemble a message received field-by-field from the transport
    pub(crate) fn from_parts(
        header: MessageHeader,
        cmd: Command,
        fixed: FixedPayload,
        payload: Bytes,
    ) -> Self {
        Self {
            header,
            cmd,
            fixed,
            payload,
        }
    }

    /// Message header
    #[must_use]
    pub const fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Command identifier
    #[must_use]
    pub const fn command(&self) -> Command {
        self.cmd
    }

    /// Command-specific fixed payload
    #[must_use]
    pub const fn fixed(&self) -> &FixedPayload {
        &self.fixed
    }

    /// Variable payload
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Parse this message's variable payload as a RINIT port array
    ///
    /// Fails unless the message is a RINIT whose payload holds exactly
    /// `cpus` big-endian port entries.
    pub fn ports(&self) -> Result<Vec<u32>> {
        let FixedPayload::Rinit { cpus } = self.fixed else {
            return Err(Error::UnexpectedCommand { cmd: self.cmd });
        };

        let needed = cpus as usize * 4;
        if self.payload.len() != needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: self.payload.len(),
            });
        }

        Ok(self
            .payload
            .chunks_exact(4)
            .map(|b| u32::from_be_bytes(b.try_into().unwrap()))
            .collect())
    }

    /// Wire encoding of the header and fixed payload
    ///
    /// The transport writes this contiguously, then the variable payload.
    pub(crate) fn encode_head(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.cmd.fixed_len());
        bytes.extend_from_slice(&self.header.to_bytes());
        self.fixed.encode_into(&mut bytes);
        bytes
    }

    /// Encode the full frame to bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = self.encode_head();
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Decode a full frame from bytes
    ///
    /// Tolerates a `cmd_size` larger than the command's schema size: the
    /// schema-sized prefix is parsed and the excess is skipped, so a newer
    /// peer with a grown fixed payload still interoperates.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = MessageHeader::from_bytes(bytes)?;
        let cmd = header
            .command()
            .ok_or(Error::UnknownCommand { cmd: header.cmd_raw() })?;

        let total = header.size() as usize;
        if bytes.len() < total {
            return Err(Error::BufferTooSmall {
                needed: total,
                got: bytes.len(),
            });
        }

        let cmd_size = header.cmd_size() as usize;
        let schema = cmd.fixed_len();
        let take = cmd_size.min(schema);

        let mut fixed_buf = vec![0u8; schema];
        fixed_buf[..take].copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + take]);
        let fixed = FixedPayload::parse(cmd, &fixed_buf);

        let payload = Bytes::copy_from_slice(&bytes[HEADER_LEN + cmd_size..total]);

        Ok(Self {
            header,
            cmd,
            fixed,
            payload,
        })
    }
}
