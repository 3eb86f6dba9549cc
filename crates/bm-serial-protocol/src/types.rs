//! Common types used in the protocol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ProtocolError;

/// 64-bit identity of a node on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "NodeIdRepr", into = "String")]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a node id from its raw value.
    pub const fn new(id: u64) -> Self {
        NodeId(id)
    }

    /// Get the raw value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Little-endian wire encoding.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ProtocolError;

    /// Accepts decimal or `0x`-prefixed hexadecimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
            None => trimmed.replace('_', "").parse::<u64>(),
        };
        parsed
            .map(NodeId)
            .map_err(|_| ProtocolError::InvalidNodeId(s.to_string()))
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

/// Serde representation: YAML/JSON may hold the id as an integer or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum NodeIdRepr {
    Int(u64),
    Str(String),
}

impl TryFrom<NodeIdRepr> for NodeId {
    type Error = ProtocolError;

    fn try_from(repr: NodeIdRepr) -> Result<Self, Self::Error> {
        match repr {
            NodeIdRepr::Int(id) => Ok(NodeId(id)),
            NodeIdRepr::Str(s) => s.parse(),
        }
    }
}

/// Serial message types understood by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Debug output.
    Debug,
    /// Acknowledgement.
    Ack,
    /// Publish.
    Publish,
    /// Subscribe.
    Subscribe,
    /// Unsubscribe.
    Unsubscribe,
    /// Log line.
    Log,
    /// Raw network message.
    NetMsg,
    /// Set the real-time clock.
    RtcSet,
    /// Self test.
    SelfTest,
    /// Network information.
    NetworkInfo,
    /// Reboot information.
    RebootInfo,
    /// Firmware update start.
    DfuStart,
    /// Firmware update chunk.
    DfuChunk,
    /// Firmware update result.
    DfuResult,
    /// Configuration get.
    CfgGet,
    /// Configuration set.
    CfgSet,
    /// Configuration value.
    CfgValue,
    /// Configuration commit.
    CfgCommit,
    /// Configuration status request.
    CfgStatusRequest,
    /// Configuration status response.
    CfgStatusResponse,
    /// Configuration delete request.
    CfgDeleteRequest,
    /// Configuration delete response.
    CfgDeleteResponse,
    /// Configuration clear request.
    CfgClearRequest,
    /// Configuration clear response.
    CfgClearResponse,
    /// Device info request.
    DeviceInfoRequest,
    /// Device info reply.
    DeviceInfoReply,
    /// Resource request.
    ResourceRequest,
    /// Resource reply.
    ResourceReply,
    /// Node id request.
    NodeIdRequest,
    /// Node id reply.
    NodeIdReply,
    /// Baud rate request.
    BaudRateRequest,
    /// Baud rate reply.
    BaudRateReply,
}

impl MessageType {
    /// Get the wire code for this message type.
    pub fn code(&self) -> u8 {
        match self {
            MessageType::Debug => BM_SERIAL_DEBUG,
            MessageType::Ack => BM_SERIAL_ACK,
            MessageType::Publish => BM_SERIAL_PUB,
            MessageType::Subscribe => BM_SERIAL_SUB,
            MessageType::Unsubscribe => BM_SERIAL_UNSUB,
            MessageType::Log => BM_SERIAL_LOG,
            MessageType::NetMsg => BM_SERIAL_NET_MSG,
            MessageType::RtcSet => BM_SERIAL_RTC_SET,
            MessageType::SelfTest => BM_SERIAL_SELF_TEST,
            MessageType::NetworkInfo => BM_SERIAL_NETWORK_INFO,
            MessageType::RebootInfo => BM_SERIAL_REBOOT_INFO,
            MessageType::DfuStart => BM_SERIAL_DFU_START,
            MessageType::DfuChunk => BM_SERIAL_DFU_CHUNK,
            MessageType::DfuResult => BM_SERIAL_DFU_RESULT,
            MessageType::CfgGet => BM_SERIAL_CFG_GET,
            MessageType::CfgSet => BM_SERIAL_CFG_SET,
            MessageType::CfgValue => BM_SERIAL_CFG_VALUE,
            MessageType::CfgCommit => BM_SERIAL_CFG_COMMIT,
            MessageType::CfgStatusRequest => BM_SERIAL_CFG_STATUS_REQ,
            MessageType::CfgStatusResponse => BM_SERIAL_CFG_STATUS_RESP,
            MessageType::CfgDeleteRequest => BM_SERIAL_CFG_DEL_REQ,
            MessageType::CfgDeleteResponse => BM_SERIAL_CFG_DEL_RESP,
            MessageType::CfgClearRequest => BM_SERIAL_CFG_CLEAR_REQ,
            MessageType::CfgClearResponse => BM_SERIAL_CFG_CLEAR_RESP,
            MessageType::DeviceInfoRequest => BM_SERIAL_DEVICE_INFO_REQ,
            MessageType::DeviceInfoReply => BM_SERIAL_DEVICE_INFO_REPLY,
            MessageType::ResourceRequest => BM_SERIAL_RESOURCE_REQ,
            MessageType::ResourceReply => BM_SERIAL_RESOURCE_REPLY,
            MessageType::NodeIdRequest => BM_SERIAL_NODE_ID_REQ,
            MessageType::NodeIdReply => BM_SERIAL_NODE_ID_REPLY,
            MessageType::BaudRateRequest => BM_SERIAL_BAUD_RATE_REQ,
            MessageType::BaudRateReply => BM_SERIAL_BAUD_RATE_REPLY,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let message_type = match code {
            BM_SERIAL_DEBUG => MessageType::Debug,
            BM_SERIAL_ACK => MessageType::Ack,
            BM_SERIAL_PUB => MessageType::Publish,
            BM_SERIAL_SUB => MessageType::Subscribe,
            BM_SERIAL_UNSUB => MessageType::Unsubscribe,
            BM_SERIAL_LOG => MessageType::Log,
            BM_SERIAL_NET_MSG => MessageType::NetMsg,
            BM_SERIAL_RTC_SET => MessageType::RtcSet,
            BM_SERIAL_SELF_TEST => MessageType::SelfTest,
            BM_SERIAL_NETWORK_INFO => MessageType::NetworkInfo,
            BM_SERIAL_REBOOT_INFO => MessageType::RebootInfo,
            BM_SERIAL_DFU_START => MessageType::DfuStart,
            BM_SERIAL_DFU_CHUNK => MessageType::DfuChunk,
            BM_SERIAL_DFU_RESULT => MessageType::DfuResult,
            BM_SERIAL_CFG_GET => MessageType::CfgGet,
            BM_SERIAL_CFG_SET => MessageType::CfgSet,
            BM_SERIAL_CFG_VALUE => MessageType::CfgValue,
            BM_SERIAL_CFG_COMMIT => MessageType::CfgCommit,
            BM_SERIAL_CFG_STATUS_REQ => MessageType::CfgStatusRequest,
            BM_SERIAL_CFG_STATUS_RESP => MessageType::CfgStatusResponse,
            BM_SERIAL_CFG_DEL_REQ => MessageType::CfgDeleteRequest,
            BM_SERIAL_CFG_DEL_RESP => MessageType::CfgDeleteResponse,
            BM_SERIAL_CFG_CLEAR_REQ => MessageType::CfgClearRequest,
            BM_SERIAL_CFG_CLEAR_RESP => MessageType::CfgClearResponse,
            BM_SERIAL_DEVICE_INFO_REQ => MessageType::DeviceInfoRequest,
            BM_SERIAL_DEVICE_INFO_REPLY => MessageType::DeviceInfoReply,
            BM_SERIAL_RESOURCE_REQ => MessageType::ResourceRequest,
            BM_SERIAL_RESOURCE_REPLY => MessageType::ResourceReply,
            BM_SERIAL_NODE_ID_REQ => MessageType::NodeIdRequest,
            BM_SERIAL_NODE_ID_REPLY => MessageType::NodeIdReply,
            BM_SERIAL_BAUD_RATE_REQ => MessageType::BaudRateRequest,
            BM_SERIAL_BAUD_RATE_REPLY => MessageType::BaudRateReply,
            _ => return Err(ProtocolError::UnknownMessageType(code)),
        };
        Ok(message_type)
    }
}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new(0xC0FFEEEEF0CACC1A);
        assert_eq!(id.to_string(), "0xC0FFEEEEF0CACC1A");
        assert_eq!(NodeId::new(1).to_string(), "0x0000000000000001");
    }

    #[test]
    fn test_node_id_parse() {
        assert_eq!("0xC0FFEEEEF0CACC1A".parse::<NodeId>(), Ok(NodeId(0xC0FFEEEEF0CACC1A)));
        assert_eq!("0xc0ff_eeee_f0ca_cc1a".parse::<NodeId>(), Ok(NodeId(0xC0FFEEEEF0CACC1A)));
        assert_eq!("42".parse::<NodeId>(), Ok(NodeId(42)));
        assert!(matches!(
            "0xnothex".parse::<NodeId>(),
            Err(ProtocolError::InvalidNodeId(_))
        ));
    }

    #[test]
    fn test_node_id_serde() {
        let id: NodeId = serde_yaml::from_str("\"0xC0FFEEEEF0CACC1A\"").unwrap();
        assert_eq!(id, NodeId(0xC0FFEEEEF0CACC1A));

        let id: NodeId = serde_yaml::from_str("1234").unwrap();
        assert_eq!(id, NodeId(1234));

        let yaml = serde_yaml::to_string(&NodeId(0xAB)).unwrap();
        assert!(yaml.contains("0x00000000000000AB"));
    }

    #[test]
    fn test_message_type_roundtrip_codes() {
        for code in 0..=u8::MAX {
            if let Ok(message_type) = MessageType::try_from(code) {
                assert_eq!(message_type.code(), code);
            }
        }
        assert_eq!(MessageType::try_from(BM_SERIAL_PUB), Ok(MessageType::Publish));
        assert_eq!(
            MessageType::try_from(0x0B),
            Err(ProtocolError::UnknownMessageType(0x0B))
        );
    }
}
