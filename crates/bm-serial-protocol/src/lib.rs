//! Bristlemouth Serial Protocol
//!
//! This crate provides the wire format used by a microcontroller to join a
//! Bristlemouth pub/sub bus over a single UART. It has no I/O of its own: it
//! builds outbound frames and decodes inbound ones, and leaves the transport
//! to the caller.
//!
//! # Protocol Overview
//!
//! Every frame starts with a 4-byte header:
//!
//! ```text
//! +------+----------+-------------+-------------+---------------+
//! | type | reserved | checksum_lo | checksum_hi | body ...      |
//! +------+----------+-------------+-------------+---------------+
//! ```
//!
//! - **Outbound** (host → bus): the checksum is computed over the whole frame
//!   with the checksum bytes zeroed, the frame is byte-stuffed (COBS) and a
//!   single `0x00` delimiter is appended.
//! - **Inbound** (bus → host): the bytes of one UART burst are taken as one
//!   raw frame. No stuffing removal happens on this leg.
//!
//! # Example
//!
//! ```rust
//! use bm_serial_protocol::{build_subscribe, parse_publish, NodeId, OutboundFrame};
//!
//! // Build a subscribe frame ready for the UART
//! let wire = build_subscribe("device/led")?;
//! assert_eq!(wire.last(), Some(&0x00));
//!
//! // Decode the body of a received publish
//! let frame = OutboundFrame::PublishRaw {
//!     node_id: NodeId::new(0x1234),
//!     topic: "device/led".to_string(),
//!     version: 1,
//!     data: b"on".to_vec(),
//! };
//! assert!(frame.encode().is_ok());
//! assert!(parse_publish(&[0u8; 4]).is_none());
//! # Ok::<(), bm_serial_protocol::ProtocolError>(())
//! ```

mod checksum;
mod cobs;
mod constants;
mod error;
mod frame;
mod outbound;
mod publish;
mod types;

pub use checksum::*;
pub use cobs::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use outbound::*;
pub use publish::*;
pub use types::*;
