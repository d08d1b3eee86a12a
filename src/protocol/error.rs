//! Protocol and transport error types

use thiserror::Error;

use super::command::Command;

/// Errors raised while encoding, decoding, or exchanging session messages
#[derive(Error, Debug)]
pub enum Error {
    /// Declared message size outside the valid range
    #[error("invalid message size: {size} bytes (valid range {min}..={max})")]
    InvalidSize {
        /// Declared total size
        size: u32,
        /// Minimum valid size (header length)
        min: u32,
        /// Maximum valid size
        max: u32,
    },

    /// Command identifier not in the known command set
    #[error("unknown command: {cmd}")]
    UnknownCommand {
        /// Offending command value
        cmd: u32,
    },

    /// A known command arrived where the protocol state does not allow it
    #[error("unexpected command: {cmd}")]
    UnexpectedCommand {
        /// The command that was received
        cmd: Command,
    },

    /// The peer closed the session while a reply was expected
    #[error("session closed by peer")]
    SessionClosed,

    /// Zero-byte read before a full message was consumed
    #[error("peer disconnected mid-message")]
    Disconnected,

    /// No data arrived within the wait window
    #[error("timed out waiting for a message")]
    Timeout,

    /// Declared option list overruns the enclosing message size
    #[error("option list overruns the declared message size")]
    TruncatedOptions,

    /// A single option claims more bytes than allowed
    #[error("option too large: {size} bytes (max {max})")]
    OptionTooLarge {
        /// Declared option size
        size: u32,
        /// Maximum allowed option size
        max: u32,
    },

    /// Option with an unrecognized command or an impossible size
    #[error("malformed option {index}: size={size} cmd={cmd}")]
    MalformedOption {
        /// Zero-based position in the option list
        index: u32,
        /// Declared option size
        size: u32,
        /// Declared option command
        cmd: u32,
    },

    /// TINIT announced a page size of zero
    #[error("invalid page size: {page_size}")]
    InvalidPageSize {
        /// Announced page size
        page_size: u32,
    },

    /// Buffer too small to hold the frame being decoded
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Allocation for a variable payload failed
    #[error("out of memory allocating {bytes} payload bytes")]
    OutOfMemory {
        /// Requested allocation size
        bytes: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
