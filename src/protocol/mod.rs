//! Wire format, commands, and codec for the trace session protocol

mod command;
mod error;
mod header;
mod message;
pub mod options;

pub use command::Command;
pub use error::{Error, Result};
pub use header::MessageHeader;
pub use message::{FixedPayload, Message};
pub use options::{OptionCommand, OptionRecord, decode_options, encode_options};

/// Header size in bytes
pub const HEADER_LEN: usize = 12;

/// Maximum total message size: two network pages
pub const MSG_MAX_LEN: usize = 8192;

/// Maximum variable payload per SEND_DATA message
pub const MSG_MAX_DATA_LEN: usize = MSG_MAX_LEN - HEADER_LEN;

/// Maximum declared size of a single option record
pub const MAX_OPTION_SIZE: usize = 4096;
