//! Metric definitions for the serial client.
//!
//! Counters are declared once as [`Counter`] constants so names stay
//! consistent between the code that records them and the host that exports
//! them. Nothing is recorded unless the host installs a `metrics` recorder.
//!
//! ```rust,ignore
//! bm_serial::metrics::describe_metrics();
//! bm_serial::metrics::FRAMES_TX.increment(1);
//! ```

use metrics::{describe_counter, Unit};

/// A counter declaration with its metadata.
#[derive(Debug, Clone, Copy)]
pub struct Counter {
    /// Metric name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement.
    pub unit: Unit,
}

impl Counter {
    /// Declare a counter.
    pub const fn new(name: &'static str, unit: Unit, description: &'static str) -> Self {
        Counter {
            name,
            description,
            unit,
        }
    }

    /// Register the description with the installed recorder.
    pub fn describe(&self) {
        describe_counter!(self.name, self.unit, self.description);
    }

    /// Add `value` to the counter.
    pub fn increment(&self, value: u64) {
        metrics::counter!(self.name).increment(value);
    }
}

/// Frames written to the transport.
pub const FRAMES_TX: Counter = Counter::new(
    "bm_serial.frames.tx",
    Unit::Count,
    "Frames written to the transport",
);
/// Bytes written to the transport, after stuffing.
pub const BYTES_TX: Counter = Counter::new(
    "bm_serial.bytes.tx",
    Unit::Bytes,
    "Bytes written to the transport",
);
/// Bytes read from the transport.
pub const BYTES_RX: Counter = Counter::new(
    "bm_serial.bytes.rx",
    Unit::Bytes,
    "Bytes read from the transport",
);
/// Bursts received and treated as frames.
pub const FRAMES_RX: Counter = Counter::new(
    "bm_serial.frames.rx",
    Unit::Count,
    "Bursts received and treated as frames",
);
/// Inbound frames dropped as malformed or of unknown type.
pub const FRAMES_DISCARDED: Counter = Counter::new(
    "bm_serial.frames.discarded",
    Unit::Count,
    "Inbound frames dropped as malformed or of unknown type",
);
/// Inbound frames of a known type that the client does not consume.
pub const FRAMES_IGNORED: Counter = Counter::new(
    "bm_serial.frames.ignored",
    Unit::Count,
    "Inbound frames of a known type the client does not consume",
);
/// Publish records handed to the dispatcher.
pub const PUBLISH_DISPATCHED: Counter = Counter::new(
    "bm_serial.publish.dispatched",
    Unit::Count,
    "Publish records handed to the dispatcher",
);
/// Consumer invocations that returned an error or panicked.
pub const CONSUMER_FAILURES: Counter = Counter::new(
    "bm_serial.consumer.failures",
    Unit::Count,
    "Consumer invocations that returned an error or panicked",
);

/// Every counter the client records.
pub const ALL_COUNTERS: &[Counter] = &[
    FRAMES_TX,
    BYTES_TX,
    BYTES_RX,
    FRAMES_RX,
    FRAMES_DISCARDED,
    FRAMES_IGNORED,
    PUBLISH_DISPATCHED,
    CONSUMER_FAILURES,
];

/// Describe all counters. Call once after installing a recorder.
pub fn describe_metrics() {
    for counter in ALL_COUNTERS {
        counter.describe();
    }
}
