//! Session option records
//!
//! A TINIT message may carry a list of self-describing option records after
//! its fixed payload. Each record declares its own total size (including the
//! 8-byte record header) so future options can carry bodies; the only option
//! defined today is `UseTcp`, which carries none.
//!
//! Decoding is strict: one malformed, oversized, or unrecognized option fails
//! the whole list.

use super::{Error, HEADER_LEN, MAX_OPTION_SIZE, Result};

/// Size of an option record header (size + command)
pub const OPTION_HDR_LEN: usize = 8;

/// Option commands understood by this endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OptionCommand {
    /// Stream trace data over TCP instead of the default transport
    UseTcp = 1,
}

impl OptionCommand {
    /// Convert from the wire value
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::UseTcp),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// One decoded option record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRecord {
    size: u32,
    cmd: OptionCommand,
}

impl OptionRecord {
    /// The `UseTcp` option (no body)
    #[must_use]
    pub const fn use_tcp() -> Self {
        Self {
            size: OPTION_HDR_LEN as u32,
            cmd: OptionCommand::UseTcp,
        }
    }

    /// Declared total size of this record in bytes
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Option command
    #[must_use]
    pub const fn command(&self) -> OptionCommand {
        self.cmd
    }
}

/// Encode a list of options as TINIT variable-payload bytes
#[must_use]
pub fn encode_options(options: &[OptionRecord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(options.len() * OPTION_HDR_LEN);
    for opt in options {
        bytes.extend_from_slice(&opt.size.to_be_bytes());
        bytes.extend_from_slice(&opt.cmd.as_u32().to_be_bytes());
    }
    bytes
}

/// Decode `opt_num` option records from a TINIT variable payload
///
/// `declared_size` and `cmd_size` come from the enclosing message header;
/// every record is checked against the message's declared size before it is
/// read, so a peer claiming more options than fit cannot push the cursor past
/// the buffer.
pub fn decode_options(
    payload: &[u8],
    declared_size: u32,
    cmd_size: u32,
    opt_num: u32,
) -> Result<Vec<OptionRecord>> {
    let mut options = Vec::new();
    let mut consumed = (HEADER_LEN as u32).saturating_add(cmd_size);
    let mut offset = 0usize;

    for index in 0..opt_num {
        if consumed.saturating_add(OPTION_HDR_LEN as u32) > declared_size {
            return Err(Error::TruncatedOptions);
        }

        let Some(record) = payload.get(offset..offset + OPTION_HDR_LEN) else {
            return Err(Error::TruncatedOptions);
        };
        let size = u32::from_be_bytes(record[0..4].try_into().unwrap());
        let cmd = u32::from_be_bytes(record[4..8].try_into().unwrap());

        consumed = consumed.saturating_add(size);
        if declared_size < consumed {
            return Err(Error::TruncatedOptions);
        }
        if size > MAX_OPTION_SIZE as u32 {
            return Err(Error::OptionTooLarge {
                size,
                max: MAX_OPTION_SIZE as u32,
            });
        }
        // A record smaller than its own header cannot advance the cursor
        if size < OPTION_HDR_LEN as u32 {
            return Err(Error::MalformedOption { index, size, cmd });
        }

        let Some(cmd) = OptionCommand::from_u32(cmd) else {
            return Err(Error::MalformedOption { index, size, cmd });
        };

        options.push(OptionRecord { size, cmd });
        offset += size as usize;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tinit_sizes(payload_len: usize) -> (u32, u32) {
        // (declared message size, cmd_size) for a TINIT carrying payload_len
        (12 + 12 + payload_len as u32, 12)
    }

    #[test]
    fn test_options_roundtrip() {
        let options = [OptionRecord::use_tcp(), OptionRecord::use_tcp()];
        let bytes = encode_options(&options);
        assert_eq!(bytes.len(), 16);

        let (size, cmd_size) = tinit_sizes(bytes.len());
        let decoded = decode_options(&bytes, size, cmd_size, 2).unwrap();
        assert_eq!(decoded.as_slice(), &options);
    }

    #[test]
    fn test_empty_options() {
        let (size, cmd_size) = tinit_sizes(0);
        let decoded = decode_options(&[], size, cmd_size, 0).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut bytes = encode_options(&[OptionRecord::use_tcp()]);
        bytes[4..8].copy_from_slice(&7u32.to_be_bytes());

        let (size, cmd_size) = tinit_sizes(bytes.len());
        let result = decode_options(&bytes, size, cmd_size, 1);
        assert!(matches!(
            result,
            Err(Error::MalformedOption {
                index: 0,
                size: 8,
                cmd: 7
            })
        ));
    }

    #[test]
    fn test_oversized_option_rejected() {
        let mut bytes = vec![0u8; 8192];
        bytes[0..4].copy_from_slice(&4097u32.to_be_bytes());
        bytes[4..8].copy_from_slice(&OptionCommand::UseTcp.as_u32().to_be_bytes());

        // declared size large enough that the size check fires first
        let result = decode_options(&bytes, 8192, 12, 1);
        assert!(matches!(
            result,
            Err(Error::OptionTooLarge { size: 4097, max: 4096 })
        ));
    }

    #[test]
    fn test_option_count_exceeds_declared_size() {
        let bytes = encode_options(&[OptionRecord::use_tcp()]);

        // message declares room for one option but claims two
        let (size, cmd_size) = tinit_sizes(bytes.len());
        let result = decode_options(&bytes, size, cmd_size, 2);
        assert!(matches!(result, Err(Error::TruncatedOptions)));
    }

    #[test]
    fn test_option_overruns_declared_size() {
        let mut bytes = encode_options(&[OptionRecord::use_tcp()]);
        // record claims 64 bytes but the message only declares 8
        bytes[0..4].copy_from_slice(&64u32.to_be_bytes());

        let (size, cmd_size) = tinit_sizes(8);
        let result = decode_options(&bytes, size, cmd_size, 1);
        assert!(matches!(result, Err(Error::TruncatedOptions)));
    }

    #[test]
    fn test_zero_size_option_rejected() {
        let mut bytes = encode_options(&[OptionRecord::use_tcp()]);
        bytes[0..4].copy_from_slice(&0u32.to_be_bytes());

        let (size, cmd_size) = tinit_sizes(bytes.len());
        let result = decode_options(&bytes, size, cmd_size, 1);
        assert!(matches!(result, Err(Error::MalformedOption { size: 0, .. })));
    }
}
