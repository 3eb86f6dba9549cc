//! Human-readable rendering of received publishes.

use bm_serial_protocol::PublishRecord;
use tracing::{debug, info};

/// A publish rendered for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// Data as text with trailing terminators trimmed, when it is UTF-8.
    pub text: Option<String>,
    /// Data as lowercase hex.
    pub hex: String,
    /// Data pretty-printed, when it parses as JSON.
    pub json: Option<String>,
}

impl RecordReport {
    pub fn new(record: &PublishRecord) -> Self {
        let text = record.data_text().map(str::to_string);
        let json = text
            .as_deref()
            .and_then(|t| serde_json::from_str::<serde_json::Value>(t).ok())
            .and_then(|value| serde_json::to_string_pretty(&value).ok());

        RecordReport {
            text,
            hex: hex::encode(&record.data),
            json,
        }
    }
}

/// Log one publish.
pub fn log_record(record: &PublishRecord) {
    let report = RecordReport::new(record);
    info!(
        node_id = %record.node_id,
        msg_type = record.msg_type,
        version = record.version,
        topic = %record.topic,
        data_len = record.data_len(),
        text = report.text.as_deref().unwrap_or(""),
        "publish"
    );
    debug!(hex = %report.hex, "publish data");
    if let Some(json) = report.json {
        info!("\n{json}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_serial_protocol::NodeId;

    fn record(data: &[u8]) -> PublishRecord {
        PublishRecord {
            node_id: NodeId(1),
            msg_type: 1,
            version: 1,
            topic_len: 10,
            topic: "device/led".into(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_json_payload() {
        let report = RecordReport::new(&record(b"{\"led\":\"on\"}\r\n"));
        assert_eq!(report.text.as_deref(), Some("{\"led\":\"on\"}"));
        assert_eq!(report.json.as_deref(), Some("{\n  \"led\": \"on\"\n}"));
        assert!(report.hex.starts_with("7b22"));
    }

    #[test]
    fn test_plain_text_payload() {
        let report = RecordReport::new(&record(b"hello\0"));
        assert_eq!(report.text.as_deref(), Some("hello"));
        assert_eq!(report.json, None);
        assert_eq!(report.hex, "68656c6c6f00");
    }

    #[test]
    fn test_binary_payload() {
        let report = RecordReport::new(&record(&[0xFF, 0x00, 0x10]));
        assert_eq!(report.text, None);
        assert_eq!(report.json, None);
        assert_eq!(report.hex, "ff0010");
    }
}
