//! End-to-end session tests over loopback TCP

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use tracemsg::{
    Connection, Error, MSG_MAX_DATA_LEN, Role, SessionConfig, SessionStream,
};

/// Stream shim that moves at most one byte per read/write call
struct OneByte<S>(S);

impl<S: Read> Read for OneByte<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let take = buf.len().min(1);
        self.0.read(&mut buf[..take])
    }
}

impl<S: Write> Write for OneByte<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let take = buf.len().min(1);
        self.0.write(&buf[..take])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<S: SessionStream> SessionStream for OneByte<S> {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.0.set_read_timeout(timeout)
    }
}

fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

fn trace_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn full_session_roundtrip() {
    let (client_stream, server_stream) = tcp_pair();
    let payload = trace_payload(2 * MSG_MAX_DATA_LEN + 300);
    let expected = payload.clone();

    let server = thread::spawn(move || {
        let mut server = Connection::server(server_stream, SessionConfig::default());

        let page_size = server.initial_setting().unwrap();
        assert_eq!(page_size, 4096);
        assert_eq!(server.cpu_count(), 4);
        assert!(server.use_tcp());

        server.send_port_array(&[8800, 8801, 8802, 8803]).unwrap();

        let mut sink = Vec::new();
        server.collect_data(&mut sink).unwrap();
        sink
    });

    let mut client = Connection::client(client_stream, SessionConfig::default());
    client.set_cpu_count(4);
    client.set_use_tcp(true);

    let ports = client.send_session_init().unwrap();
    assert_eq!(ports, vec![8800, 8801, 8802, 8803]);

    client.send_data(&payload).unwrap();
    client.finish_data().unwrap();
    client.send_close().unwrap();

    let collected = server.join().unwrap();
    assert_eq!(collected, expected);
}

#[test]
fn session_survives_one_byte_reads_and_writes() {
    let (client_stream, server_stream) = tcp_pair();
    let payload = trace_payload(513);
    let expected = payload.clone();

    let server = thread::spawn(move || {
        let mut server = Connection::server(OneByte(server_stream), SessionConfig::default());

        let page_size = server.initial_setting().unwrap();
        assert_eq!(page_size, 4096);

        server.send_port_array(&[9000]).unwrap();

        let mut sink = Vec::new();
        server.collect_data(&mut sink).unwrap();
        sink
    });

    let mut client = Connection::client(OneByte(client_stream), SessionConfig::default());
    client.set_cpu_count(1);

    let ports = client.send_session_init().unwrap();
    assert_eq!(ports, vec![9000]);

    client.send_data(&payload).unwrap();
    client.finish_data().unwrap();
    client.send_close().unwrap();

    let collected = server.join().unwrap();
    assert_eq!(collected, expected);
}

#[test]
fn empty_capture_still_closes_cleanly() {
    let (client_stream, server_stream) = tcp_pair();

    let server = thread::spawn(move || {
        let mut server = Connection::server(server_stream, SessionConfig::default());
        let mut sink = Vec::new();
        server.collect_data(&mut sink).unwrap();
        sink
    });

    let mut client = Connection::client(client_stream, SessionConfig::default());
    client.send_data(&[]).unwrap();
    client.finish_data().unwrap();
    client.send_close().unwrap();

    assert!(server.join().unwrap().is_empty());
}

#[test]
fn silent_client_times_out() {
    let (client_stream, server_stream) = tcp_pair();

    let config = SessionConfig {
        wait_timeout: Duration::from_millis(50),
        ..SessionConfig::default()
    };
    let mut server = Connection::server(server_stream, config);

    let result = server.initial_setting();
    assert!(matches!(result, Err(Error::Timeout)));

    drop(client_stream);
}

#[test]
fn vanishing_client_is_a_disconnect() {
    let (client_stream, server_stream) = tcp_pair();

    // half a header, then gone
    let mut client_stream = client_stream;
    client_stream.write_all(&[0u8; 5]).unwrap();
    drop(client_stream);

    let mut server = Connection::server(server_stream, SessionConfig::default());
    assert!(matches!(server.initial_setting(), Err(Error::Disconnected)));
}

#[test]
fn roles_are_recorded() {
    let (client_stream, server_stream) = tcp_pair();

    let client = Connection::client(client_stream, SessionConfig::default());
    let server = Connection::server(server_stream, SessionConfig::default());
    assert_eq!(client.role(), Role::Client);
    assert_eq!(server.role(), Role::Server);
}
