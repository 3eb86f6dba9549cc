//! UART bridged over TCP.
//!
//! Some hosts expose a device UART as a TCP port (a serial-to-network bridge
//! or a simulator giving every node its own port). This transport attaches to
//! such a port with a non-blocking socket so reads never stall the poll loop.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::Transport;

/// How long a write keeps retrying a full socket buffer before giving up.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause between retries when the socket buffer is full.
const WRITE_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Non-blocking TCP connection to a UART endpoint.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    write_timeout: Duration,
}

impl TcpTransport {
    /// Connect to a UART endpoint.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Self::from_stream(TcpStream::connect(addr)?)
    }

    /// Connect with a bound on how long the TCP handshake may take.
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> io::Result<Self> {
        Self::from_stream(TcpStream::connect_timeout(addr, timeout)?)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        debug!(%peer, "UART TCP transport connected");
        Ok(TcpTransport {
            stream,
            peer,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// Set how long a write may wait on a full socket buffer.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Address of the UART endpoint.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    /// Writes as much of `data` as the socket takes before the write timeout.
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let deadline = Instant::now() + self.write_timeout;
        let mut written = 0;

        while written < data.len() {
            match self.stream.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        debug!(peer = %self.peer, written, total = data.len(), "UART write timed out");
                        break;
                    }
                    std::thread::sleep(WRITE_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }

        match self.stream.flush() {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e),
        }
        Ok(written)
    }

    fn read_available(&mut self, max_len: usize) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; max_len];
        match self.stream.read(&mut buf) {
            Ok(0) if max_len > 0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "UART connection closed",
            )),
            Ok(n) => {
                trace!(peer = %self.peer, len = n, "UART rx");
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
