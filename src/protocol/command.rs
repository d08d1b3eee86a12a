//! Session commands and their fixed-payload schema

use std::fmt;

/// Commands exchanged between a controller and a trace producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// Terminate the logical session
    Close = 0,
    /// Client-to-server session init (cpus, page size, options)
    Tinit = 1,
    /// Server-to-client reply carrying per-CPU ports
    Rinit = 2,
    /// Raw trace data chunk
    SendData = 3,
    /// End of the data stream
    FinData = 4,
}

impl Command {
    /// Convert from the wire value
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Close),
            1 => Some(Self::Tinit),
            2 => Some(Self::Rinit),
            3 => Some(Self::SendData),
            4 => Some(Self::FinData),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size in bytes of the command-specific fixed payload
    #[must_use]
    pub const fn fixed_len(self) -> usize {
        match self {
            Self::Tinit => 12,
            Self::Rinit => 4,
            Self::Close | Self::SendData | Self::FinData => 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Close => "CLOSE",
            Self::Tinit => "TINIT",
            Self::Rinit => "RINIT",
            Self::SendData => "SEND_DATA",
            Self::FinData => "FIN_DATA",
        };
        write!(f, "{name}")
    }
}
