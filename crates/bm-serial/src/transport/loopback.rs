//! In-memory transport pair.

use std::io;

use bytes::BytesMut;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::Transport;

/// One end of an in-memory, bidirectional byte link.
///
/// Bytes written on one end become readable on the other, preserving order.
/// Useful for tests and for hosting a client next to a simulated peer.
#[derive(Debug)]
pub struct LoopbackTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    pending: BytesMut,
    write_limit: Option<usize>,
    peer_closed: bool,
}

impl LoopbackTransport {
    /// Create a connected pair of transports.
    pub fn new_pair() -> (Self, Self) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();
        (Self::from_channels(a_tx, a_rx), Self::from_channels(b_tx, b_rx))
    }

    fn from_channels(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>) -> Self {
        LoopbackTransport {
            tx,
            rx,
            pending: BytesMut::new(),
            write_limit: None,
            peer_closed: false,
        }
    }

    /// Accept at most `limit` bytes per write, to exercise short writes.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Read everything currently available, ignoring chunk boundaries.
    pub fn drain(&mut self) -> Vec<u8> {
        self.fill_pending();
        self.pending.split().to_vec()
    }

    fn fill_pending(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.peer_closed = true;
                    break;
                }
            }
        }
    }
}

impl Transport for LoopbackTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let len = self.write_limit.map_or(data.len(), |limit| data.len().min(limit));
        if len == 0 {
            return Ok(0);
        }
        self.tx
            .send(data[..len].to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "loopback peer dropped"))?;
        Ok(len)
    }

    fn read_available(&mut self, max_len: usize) -> io::Result<Option<Vec<u8>>> {
        self.fill_pending();
        if self.pending.is_empty() {
            if self.peer_closed {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "loopback peer dropped",
                ));
            }
            return Ok(None);
        }

        let len = self.pending.len().min(max_len);
        Ok(Some(self.pending.split_to(len).to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_bidirectional() {
        let (mut host, mut peer) = LoopbackTransport::new_pair();

        assert_eq!(host.write(b"ping").unwrap(), 4);
        assert_eq!(peer.read_available(64).unwrap(), Some(b"ping".to_vec()));

        assert_eq!(peer.write(b"pong").unwrap(), 4);
        assert_eq!(host.read_available(64).unwrap(), Some(b"pong".to_vec()));
        assert_eq!(host.read_available(64).unwrap(), None);
    }

    #[test]
    fn test_read_honours_max_len() {
        let (mut host, mut peer) = LoopbackTransport::new_pair();
        peer.write(b"abc").unwrap();
        peer.write(b"defg").unwrap();

        assert_eq!(host.read_available(5).unwrap(), Some(b"abcde".to_vec()));
        assert_eq!(host.read_available(5).unwrap(), Some(b"fg".to_vec()));
        assert_eq!(host.read_available(5).unwrap(), None);
    }

    #[test]
    fn test_write_limit_reports_short_count() {
        let (host, mut peer) = LoopbackTransport::new_pair();
        let mut host = host.with_write_limit(3);

        assert_eq!(host.write(b"abcdef").unwrap(), 3);
        assert_eq!(peer.drain(), b"abc".to_vec());
    }

    #[test]
    fn test_dropped_peer() {
        let (mut host, peer) = LoopbackTransport::new_pair();
        drop(peer);

        assert_eq!(
            host.write(b"x").unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert_eq!(
            host.read_available(8).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
