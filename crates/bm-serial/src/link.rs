//! Inbound framing by UART idle gap.
//!
//! The peer sends each frame as one burst of bytes. The reader collects bytes
//! until the line has been quiet for the idle timeout and hands the whole
//! burst back as one frame. Bursts are not unstuffed and two frames sent
//! back-to-back inside one idle window come back as a single burst.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::clock::Clock;
use crate::error::Result;
use crate::transport::Transport;

/// Default silence that ends a burst.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(500);
/// Default pause between empty reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Default largest read requested from the transport.
pub const DEFAULT_RX_BUFFER_SIZE: usize = 512;

/// Link reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Silence that ends a burst when `poll_default` is used.
    pub idle_timeout: Duration,
    /// Pause between reads that returned nothing.
    pub poll_interval: Duration,
    /// Largest read requested from the transport at once.
    pub rx_buffer_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
        }
    }
}

/// Collects UART bursts.
#[derive(Debug)]
pub struct LinkReader {
    config: LinkConfig,
    buffer: BytesMut,
}

impl LinkReader {
    /// Create a reader with the given settings.
    pub fn new(config: LinkConfig) -> Self {
        LinkReader {
            config,
            buffer: BytesMut::with_capacity(config.rx_buffer_size),
        }
    }

    /// Reader settings.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Read until the line has been idle for `idle_timeout`.
    ///
    /// The idle clock restarts every time bytes arrive, so a peer that keeps
    /// talking keeps the call alive. Returns `Ok(None)` if nothing arrived.
    /// A transport error ends the burst and drops what was collected.
    pub fn read_burst<T, C>(
        &mut self,
        transport: &mut T,
        clock: &C,
        idle_timeout: Duration,
    ) -> Result<Option<Bytes>>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        self.buffer.clear();
        let mut last_activity = clock.elapsed();

        loop {
            match transport.read_available(self.config.rx_buffer_size)? {
                Some(chunk) if !chunk.is_empty() => {
                    trace!(len = chunk.len(), total = self.buffer.len() + chunk.len(), "burst chunk");
                    self.buffer.extend_from_slice(&chunk);
                    last_activity = clock.elapsed();
                }
                _ => {
                    if clock.elapsed().saturating_sub(last_activity) >= idle_timeout {
                        break;
                    }
                    clock.sleep(self.config.poll_interval);
                }
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }
        crate::metrics::BYTES_RX.increment(self.buffer.len() as u64);
        Ok(Some(self.buffer.split().freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::VecDeque;
    use std::io;

    /// Transport that replays a script of reads, one entry per call.
    struct ScriptedTransport {
        reads: VecDeque<io::Result<Option<Vec<u8>>>>,
        calls: usize,
    }

    impl ScriptedTransport {
        fn new(reads: Vec<io::Result<Option<Vec<u8>>>>) -> Self {
            ScriptedTransport {
                reads: reads.into(),
                calls: 0,
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            Ok(data.len())
        }

        fn read_available(&mut self, _max_len: usize) -> io::Result<Option<Vec<u8>>> {
            self.calls += 1;
            self.reads.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn test_nothing_read_returns_none_after_timeout() {
        let clock = ManualClock::new();
        let mut transport = ScriptedTransport::new(vec![]);
        let mut reader = LinkReader::new(LinkConfig::default());

        let burst = reader
            .read_burst(&mut transport, &clock, Duration::from_millis(100))
            .unwrap();

        assert!(burst.is_none());
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
        assert_eq!(transport.calls, 11);
    }

    #[test]
    fn test_chunks_accumulate_into_one_burst() {
        let clock = ManualClock::new();
        let mut transport = ScriptedTransport::new(vec![
            Ok(Some(vec![0x02, 0x00])),
            Ok(None),
            Ok(Some(vec![0x11, 0x22])),
            Ok(None),
            Ok(Some(vec![0x33])),
        ]);
        let mut reader = LinkReader::new(LinkConfig::default());

        let burst = reader
            .read_burst(&mut transport, &clock, Duration::from_millis(50))
            .unwrap()
            .unwrap();

        assert_eq!(&burst[..], &[0x02, 0x00, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_idle_clock_restarts_on_activity() {
        let clock = ManualClock::new();
        // Gaps of 4 empty reads (40ms) never reach the 50ms idle timeout
        let mut script = Vec::new();
        for i in 0..3u8 {
            script.push(Ok(Some(vec![i])));
            for _ in 0..4 {
                script.push(Ok(None));
            }
        }
        let mut transport = ScriptedTransport::new(script);
        let mut reader = LinkReader::new(LinkConfig::default());

        let burst = reader
            .read_burst(&mut transport, &clock, Duration::from_millis(50))
            .unwrap()
            .unwrap();

        assert_eq!(&burst[..], &[0, 1, 2]);
        assert!(clock.elapsed() >= Duration::from_millis(130));
    }

    #[test]
    fn test_gap_longer_than_timeout_splits_bursts() {
        let clock = ManualClock::new();
        let mut script = vec![Ok(Some(vec![0xAA]))];
        for _ in 0..10 {
            script.push(Ok(None));
        }
        script.push(Ok(Some(vec![0xBB])));
        let mut transport = ScriptedTransport::new(script);
        let mut reader = LinkReader::new(LinkConfig::default());

        let first = reader
            .read_burst(&mut transport, &clock, Duration::from_millis(30))
            .unwrap();
        assert_eq!(first.as_deref(), Some(&[0xAA][..]));

        let mut second = None;
        while second.is_none() {
            second = reader
                .read_burst(&mut transport, &clock, Duration::from_millis(30))
                .unwrap();
        }
        assert_eq!(second.as_deref(), Some(&[0xBB][..]));
    }

    #[test]
    fn test_transport_error_propagates() {
        let clock = ManualClock::new();
        let mut transport = ScriptedTransport::new(vec![
            Ok(Some(vec![0x01])),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed")),
        ]);
        let mut reader = LinkReader::new(LinkConfig::default());

        let err = reader
            .read_burst(&mut transport, &clock, Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, crate::SerialError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_zero_timeout_reads_once() {
        let clock = ManualClock::new();
        let mut transport = ScriptedTransport::new(vec![Ok(Some(vec![7])), Ok(None)]);
        let mut reader = LinkReader::new(LinkConfig::default());

        let burst = reader
            .read_burst(&mut transport, &clock, Duration::ZERO)
            .unwrap();
        assert_eq!(burst.as_deref(), Some(&[7][..]));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
