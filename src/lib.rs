//! Length-delimited message protocol for coordinating trace capture sessions
//! between a controller and one or more trace-data producers.
//!
//! A session runs over a blocking byte stream (TCP or a local socket) in
//! three stages: a TINIT/RINIT handshake negotiating CPU count, page size,
//! and options; a bulk transfer of raw trace bytes as SEND_DATA chunks; and
//! a FIN_DATA/CLOSE shutdown. Every message is a fixed 12-byte header, a
//! command-keyed fixed payload, and a length-delimited variable payload, all
//! big-endian on the wire.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//! use tracemsg::{Connection, SessionConfig};
//!
//! let stream = TcpStream::connect("127.0.0.1:8800")?;
//! let mut client = Connection::client(stream, SessionConfig::default());
//! client.set_cpu_count(4);
//!
//! // Handshake: announce the session, get one port per CPU back
//! let ports = client.send_session_init()?;
//!
//! // Stream the capture and shut down
//! client.send_data(b"trace bytes")?;
//! client.finish_data()?;
//! client.send_close()?;
//! # Ok::<(), tracemsg::Error>(())
//! ```
//!
//! The server side mirrors this with [`Connection::initial_setting`],
//! [`Connection::send_port_array`], and [`Connection::collect_data`].
//!
//! Connections are single-threaded and blocking; concurrency across multiple
//! clients is the caller's business.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod transport;

pub use protocol::{
    Command, Error, FixedPayload, HEADER_LEN, MAX_OPTION_SIZE, MSG_MAX_DATA_LEN, MSG_MAX_LEN,
    Message, MessageHeader, OptionCommand, OptionRecord, Result,
};
pub use transport::{Connection, DEFAULT_WAIT_TIMEOUT, Role, SessionConfig, SessionStream};
