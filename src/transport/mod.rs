//! Framed message exchange over blocking byte streams

mod connection;
mod handshake;
mod stream;
mod transfer;

pub use connection::{Connection, DEFAULT_WAIT_TIMEOUT, Role, SessionConfig};
pub use stream::SessionStream;
