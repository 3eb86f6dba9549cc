//! Bristlemouth serial client.
//!
//! A single-threaded client for the Bristlemouth pub/sub bus as seen over a
//! UART. It sends subscribe and publish frames, reads inbound bursts, and
//! hands every decoded publish to the registered consumers.
//!
//! ```no_run
//! use bm_serial::{BristlemouthSerial, ConsumerHandle, TcpTransport};
//! use bm_serial_protocol::NodeId;
//!
//! # fn main() -> bm_serial::Result<()> {
//! let transport = TcpTransport::connect("127.0.0.1:9000")?;
//! let mut client = BristlemouthSerial::new(transport, NodeId::new(0xC0FFEEEEF0CACC1A));
//!
//! let led = ConsumerHandle::from_fn(|record| {
//!     if record.topic_matches("device/led") {
//!         println!("led: {:?}", record.data_text());
//!     }
//!     Ok(())
//! });
//! client.subscribe("device/led", &led)?;
//! client.print("hello from the host")?;
//!
//! loop {
//!     client.poll_default()?;
//! }
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod metrics;
pub mod session;
pub mod transport;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{BmSerialConfig, LinkSettings, TopicConfig};
pub use dispatch::{
    Consumer, ConsumerError, ConsumerHandle, ConsumerResult, DispatchReport, Dispatcher,
    TopicConsumer,
};
pub use error::{ConfigError, Result, SerialError};
pub use link::{LinkConfig, LinkReader};
pub use session::{BristlemouthSerial, FrameOutcome, PollSummary};
pub use transport::{LoopbackTransport, TcpTransport, Transport};
