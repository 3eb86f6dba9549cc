//! The serial client: one instance per UART.
//!
//! Owns the transport, the clock, the link reader and the consumer registry.
//! Everything runs on the caller's thread. `poll` is the only call that
//! waits, for at most its idle timeout plus however long bytes keep arriving.

use std::time::Duration;

use bm_serial_protocol::{
    checksum_matches, InboundFrame, MessageType, NodeId, OutboundFrame, ProtocolError,
    FRAME_HEADER_SIZE, TRANSMIT_PAYLOAD_VERSION,
};
use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{BmSerialConfig, TopicConfig};
use crate::dispatch::{ConsumerHandle, DispatchReport, Dispatcher};
use crate::error::{Result, SerialError};
use crate::link::{LinkConfig, LinkReader};
use crate::metrics::{BYTES_TX, FRAMES_DISCARDED, FRAMES_IGNORED, FRAMES_RX, FRAMES_TX};
use crate::transport::Transport;

// ============================================================================
// Poll results
// ============================================================================

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A publish was decoded and handed to the consumers.
    Dispatched(DispatchReport),
    /// A well-formed frame of a type the client does not consume.
    Ignored(MessageType),
    /// Malformed or of an unknown type.
    Discarded(ProtocolError),
}

/// Totals for one call to `poll`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Bytes read from the transport.
    pub bytes_read: usize,
    /// Bursts treated as frames.
    pub frames: usize,
    /// Publish records handed to the dispatcher.
    pub dispatched: usize,
    /// Frames dropped as malformed or of unknown type.
    pub discarded: usize,
    /// Frames of a known type that nothing consumes.
    pub ignored: usize,
    /// Consumer invocations that failed.
    pub consumer_failures: usize,
}

impl PollSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Dispatched(report) => {
                self.dispatched += 1;
                self.consumer_failures += report.failed;
            }
            FrameOutcome::Ignored(_) => self.ignored += 1,
            FrameOutcome::Discarded(_) => self.discarded += 1,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Bristlemouth serial client.
pub struct BristlemouthSerial<T, C = MonotonicClock> {
    node_id: NodeId,
    topics: TopicConfig,
    transport: T,
    clock: C,
    link: LinkReader,
    dispatcher: Dispatcher,
}

impl<T: Transport> BristlemouthSerial<T, MonotonicClock> {
    /// Create a client with default topics and link settings.
    pub fn new(transport: T, node_id: NodeId) -> Self {
        Self::with_clock(transport, MonotonicClock::new(), node_id)
    }
}

impl<T: Transport, C: Clock> BristlemouthSerial<T, C> {
    /// Create a client with an explicit clock.
    pub fn with_clock(transport: T, clock: C, node_id: NodeId) -> Self {
        BristlemouthSerial {
            node_id,
            topics: TopicConfig::default(),
            transport,
            clock,
            link: LinkReader::new(LinkConfig::default()),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Create a client from a validated configuration.
    ///
    /// Configured subscriptions are not sent; they need a consumer, so the
    /// host subscribes to them after construction.
    pub fn from_config(transport: T, clock: C, config: &BmSerialConfig) -> Result<Self> {
        config.validate()?;
        Ok(BristlemouthSerial {
            node_id: config.node_id,
            topics: config.topics.clone(),
            transport,
            clock,
            link: LinkReader::new(config.link.into()),
            dispatcher: Dispatcher::new(),
        })
    }

    /// Replace the console topics.
    pub fn with_topics(mut self, topics: TopicConfig) -> Self {
        self.topics = topics;
        self
    }

    /// Replace the link settings.
    pub fn with_link_config(mut self, link: LinkConfig) -> Self {
        self.link = LinkReader::new(link);
        self
    }

    /// Identity stamped on outbound publishes.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Console topics.
    pub fn topics(&self) -> &TopicConfig {
        &self.topics
    }

    /// Link settings.
    pub fn link_config(&self) -> &LinkConfig {
        self.link.config()
    }

    /// Consumer registry.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport and clock.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    /// Register `consumer` and ask the bus for publishes on `topic`.
    ///
    /// The consumer is registered once no matter how many topics it is
    /// subscribed with, and stays registered if the write fails. It will see
    /// every publish the bus forwards, not only those on `topic`.
    pub fn subscribe(&mut self, topic: &str, consumer: &ConsumerHandle) -> Result<usize> {
        if self.dispatcher.subscribe(consumer) {
            debug!(label = ?consumer.label(), "consumer registered");
        }
        self.send(&OutboundFrame::Subscribe {
            topic: topic.to_string(),
        })
    }

    /// Send raw bytes out the console's transmit path.
    pub fn transmit(&mut self, data: &[u8]) -> Result<usize> {
        let topic = self.topics.transmit.clone();
        self.publish_raw(&topic, TRANSMIT_PAYLOAD_VERSION, data)
    }

    /// Append a line of text to `filename` on the console.
    pub fn log(&mut self, filename: &str, text: &str) -> Result<usize> {
        self.send(&OutboundFrame::PublishLog {
            node_id: self.node_id,
            topic: self.topics.log.clone(),
            filename: filename.to_string(),
            text: text.to_string(),
        })
    }

    /// Print a line of text on the console terminal.
    pub fn print(&mut self, text: &str) -> Result<usize> {
        self.send(&OutboundFrame::PublishPrint {
            node_id: self.node_id,
            topic: self.topics.print.clone(),
            text: text.to_string(),
        })
    }

    /// Publish `data` on `topic` behind a payload version byte.
    pub fn publish_raw(&mut self, topic: &str, version: u8, data: &[u8]) -> Result<usize> {
        self.send(&OutboundFrame::PublishRaw {
            node_id: self.node_id,
            topic: topic.to_string(),
            version,
            data: data.to_vec(),
        })
    }

    /// Encode and write one frame. Returns the bytes written.
    pub fn send(&mut self, frame: &OutboundFrame) -> Result<usize> {
        let wire = frame.encode()?;
        let written = self.transport.write(&wire)?;
        trace!(
            message_type = ?frame.message_type(),
            topic = frame.topic(),
            len = wire.len(),
            written,
            "frame tx"
        );
        BYTES_TX.increment(written as u64);

        if written != wire.len() {
            return Err(SerialError::ShortWrite {
                expected: wire.len(),
                written,
            });
        }
        FRAMES_TX.increment(1);
        Ok(written)
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    /// Read one burst, treat it as one frame and dispatch it.
    ///
    /// Malformed frames are counted in the summary, never returned as errors.
    /// Only a transport failure makes this return `Err`.
    pub fn poll(&mut self, idle_timeout: Duration) -> Result<PollSummary> {
        let mut summary = PollSummary::default();
        let Some(burst) = self
            .link
            .read_burst(&mut self.transport, &self.clock, idle_timeout)?
        else {
            return Ok(summary);
        };

        summary.bytes_read = burst.len();
        let outcome = self.handle_frame(&burst);
        summary.record(&outcome);
        Ok(summary)
    }

    /// `poll` with the configured idle timeout.
    pub fn poll_default(&mut self) -> Result<PollSummary> {
        let idle_timeout = self.link.config().idle_timeout;
        self.poll(idle_timeout)
    }

    /// Classify one inbound frame and dispatch it if it is a publish.
    pub fn handle_frame(&self, frame: &[u8]) -> FrameOutcome {
        FRAMES_RX.increment(1);
        // The peer's checksum is informational; frames are never rejected on it
        if frame.len() >= FRAME_HEADER_SIZE && !checksum_matches(frame) {
            trace!(len = frame.len(), "inbound checksum mismatch");
        }
        match InboundFrame::classify(frame) {
            Ok(InboundFrame::Publish(record)) => {
                trace!(
                    node_id = %record.node_id,
                    topic = %record.topic,
                    data_len = record.data_len(),
                    "publish rx"
                );
                FrameOutcome::Dispatched(self.dispatcher.dispatch(&record))
            }
            Ok(InboundFrame::Other { message_type, body }) => {
                debug!(?message_type, len = body.len(), "ignoring frame");
                FRAMES_IGNORED.increment(1);
                FrameOutcome::Ignored(message_type)
            }
            Err(e) => {
                debug!(len = frame.len(), error = %e, "discarding frame");
                FRAMES_DISCARDED.increment(1);
                FrameOutcome::Discarded(e)
            }
        }
    }
}
