//! Fixed message header
//!
//! Every message starts with the same 12 bytes, big-endian on the wire:
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Total Size (4)                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       Command (4)                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Fixed Payload Size (4)                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Total size counts the header itself, the fixed payload, and the variable
//! payload.

use super::{Command, Error, HEADER_LEN, MSG_MAX_LEN, Result};

/// Message header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    size: u32,
    cmd: u32,
    cmd_size: u32,
}

impl MessageHeader {
    /// Create a header for `cmd` followed by `payload_len` variable bytes
    #[must_use]
    pub fn new(cmd: Command, payload_len: usize) -> Self {
        let cmd_size = cmd.fixed_len() as u32;
        Self {
            size: HEADER_LEN as u32 + cmd_size + payload_len as u32,
            cmd: cmd.as_u32(),
            cmd_size,
        }
    }

    /// Declared total message size in bytes
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Command identifier as sent on the wire
    #[must_use]
    pub const fn cmd_raw(&self) -> u32 {
        self.cmd
    }

    /// Command identifier, if known
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        Command::from_u32(self.cmd)
    }

    /// Declared fixed-payload size in bytes
    #[must_use]
    pub const fn cmd_size(&self) -> u32 {
        self.cmd_size
    }

    /// Declared variable-payload size in bytes
    ///
    /// Zero when the declared size does not extend past the fixed payload.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.size.saturating_sub(HEADER_LEN as u32 + self.cmd_size) as usize
    }

    /// Validate the declared sizes against protocol bounds
    pub fn validate(&self) -> Result<()> {
        if self.size < HEADER_LEN as u32 || self.size > MSG_MAX_LEN as u32 {
            return Err(Error::InvalidSize {
                size: self.size,
                min: HEADER_LEN as u32,
                max: MSG_MAX_LEN as u32,
            });
        }

        if self.command().is_none() {
            return Err(Error::UnknownCommand { cmd: self.cmd });
        }

        // The fixed payload must fit inside the declared size, or the
        // receive path could be made to read past the frame.
        if self.cmd_size > self.size - HEADER_LEN as u32 {
            return Err(Error::InvalidSize {
                size: self.size,
                min: HEADER_LEN as u32 + self.cmd_size,
                max: MSG_MAX_LEN as u32,
            });
        }

        Ok(())
    }

    /// Convert to wire bytes (big-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.size.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.cmd.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.cmd_size.to_be_bytes());
        bytes
    }

    /// Parse and validate a header from wire bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::BufferTooSmall {
                needed: HEADER_LEN,
                got: bytes.len(),
            });
        }

        let header = Self {
            size: u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
            cmd: u32::from_be_bytes(bytes[4..8].try_into().unwrap()),
            cmd_size: u32::from_be_bytes(bytes[8..12].try_into().unwrap()),
        };

        header.validate()?;
        Ok(header)
    }
}
