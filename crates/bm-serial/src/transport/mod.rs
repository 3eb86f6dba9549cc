//! Byte transports a client can run over.
//!
//! The client needs only two things from its UART: a write that reports how
//! many bytes were accepted, and a non-blocking read of whatever bytes are
//! currently available.

mod loopback;
mod tcp;

use std::io;

pub use loopback::LoopbackTransport;
pub use tcp::TcpTransport;

/// A byte-oriented, non-blocking link to the bus.
pub trait Transport {
    /// Write `data`, returning how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read up to `max_len` bytes without blocking.
    ///
    /// Returns `Ok(None)` when nothing is available right now.
    fn read_available(&mut self, max_len: usize) -> io::Result<Option<Vec<u8>>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn read_available(&mut self, max_len: usize) -> io::Result<Option<Vec<u8>>> {
        (**self).read_available(max_len)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn read_available(&mut self, max_len: usize) -> io::Result<Option<Vec<u8>>> {
        (**self).read_available(max_len)
    }
}
