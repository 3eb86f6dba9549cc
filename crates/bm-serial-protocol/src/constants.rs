//! Protocol constants
//!
//! These constants define the message type codes, frame layout sizes and the
//! well-known console topics used by the Bristlemouth serial protocol.

// ============================================================================
// Message Types (first header byte)
// ============================================================================

/// Debug output from the bus.
pub const BM_SERIAL_DEBUG: u8 = 0x00;
/// Acknowledgement.
pub const BM_SERIAL_ACK: u8 = 0x01;
/// Publish a message to a topic.
pub const BM_SERIAL_PUB: u8 = 0x02;
/// Subscribe to a topic.
pub const BM_SERIAL_SUB: u8 = 0x03;
/// Unsubscribe from a topic.
pub const BM_SERIAL_UNSUB: u8 = 0x04;
/// Log line.
pub const BM_SERIAL_LOG: u8 = 0x05;
/// Raw network message.
pub const BM_SERIAL_NET_MSG: u8 = 0x06;
/// Set the real-time clock.
pub const BM_SERIAL_RTC_SET: u8 = 0x07;
/// Self test.
pub const BM_SERIAL_SELF_TEST: u8 = 0x08;
/// Network information.
pub const BM_SERIAL_NETWORK_INFO: u8 = 0x09;
/// Reboot information.
pub const BM_SERIAL_REBOOT_INFO: u8 = 0x0A;
/// Start a firmware update.
pub const BM_SERIAL_DFU_START: u8 = 0x30;
/// Firmware update chunk.
pub const BM_SERIAL_DFU_CHUNK: u8 = 0x31;
/// Firmware update result.
pub const BM_SERIAL_DFU_RESULT: u8 = 0x32;
/// Read a configuration value.
pub const BM_SERIAL_CFG_GET: u8 = 0x40;
/// Write a configuration value.
pub const BM_SERIAL_CFG_SET: u8 = 0x41;
/// Configuration value reply.
pub const BM_SERIAL_CFG_VALUE: u8 = 0x42;
/// Commit configuration changes.
pub const BM_SERIAL_CFG_COMMIT: u8 = 0x43;
/// Configuration status request.
pub const BM_SERIAL_CFG_STATUS_REQ: u8 = 0x44;
/// Configuration status response.
pub const BM_SERIAL_CFG_STATUS_RESP: u8 = 0x45;
/// Delete a configuration key.
pub const BM_SERIAL_CFG_DEL_REQ: u8 = 0x46;
/// Delete configuration key response.
pub const BM_SERIAL_CFG_DEL_RESP: u8 = 0x47;
/// Clear a configuration partition.
pub const BM_SERIAL_CFG_CLEAR_REQ: u8 = 0x48;
/// Clear configuration partition response.
pub const BM_SERIAL_CFG_CLEAR_RESP: u8 = 0x49;
/// Device information request.
pub const BM_SERIAL_DEVICE_INFO_REQ: u8 = 0x50;
/// Device information reply.
pub const BM_SERIAL_DEVICE_INFO_REPLY: u8 = 0x51;
/// Resource table request.
pub const BM_SERIAL_RESOURCE_REQ: u8 = 0x52;
/// Resource table reply.
pub const BM_SERIAL_RESOURCE_REPLY: u8 = 0x53;
/// Node ID request.
pub const BM_SERIAL_NODE_ID_REQ: u8 = 0x60;
/// Node ID reply.
pub const BM_SERIAL_NODE_ID_REPLY: u8 = 0x61;
/// Baud rate request.
pub const BM_SERIAL_BAUD_RATE_REQ: u8 = 0x70;
/// Baud rate reply.
pub const BM_SERIAL_BAUD_RATE_REPLY: u8 = 0x71;

// ============================================================================
// Publish Fields
// ============================================================================

/// Publish type byte written by the outbound publish header.
pub const PUB_TYPE_DEFAULT: u8 = 0x01;
/// Publish version byte written by the outbound publish header.
pub const PUB_VERSION_DEFAULT: u8 = 0x01;
/// Payload version byte written in front of console-transmit data.
pub const TRANSMIT_PAYLOAD_VERSION: u8 = 0x01;

// ============================================================================
// Well-known Topics
// ============================================================================

/// Raw data sent to the console transmit queue.
pub const TOPIC_CONSOLE_TRANSMIT: &str = "spotter/transmit-data";
/// Append a line to a file on the console's storage.
pub const TOPIC_CONSOLE_LOG: &str = "spotter/fprintf";
/// Print a line on the console terminal.
pub const TOPIC_CONSOLE_PRINT: &str = "spotter/printf";

// ============================================================================
// Sizes
// ============================================================================

/// Size of the common frame header.
pub const FRAME_HEADER_SIZE: usize = 4;
/// Fixed part of a publish body: node id, type, version, topic length.
pub const PUB_FIXED_SIZE: usize = 12;
/// Reserved zero bytes in console log/print payloads.
pub const CONSOLE_RESERVED_SIZE: usize = 8;
/// Byte that terminates every outbound frame.
pub const FRAME_DELIMITER: u8 = 0x00;
/// Longest run of non-delimiter bytes a single stuffing block can carry.
pub const MAX_STUFF_RUN: usize = 254;
