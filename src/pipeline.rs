//! Per-document conversion from flow-log blobs to relay payloads.

use crate::config::ExportOptions;
use crate::encoder::{EncodeOutcome, FlowEncoder, PacketContext};
use crate::payload::RelayPayload;
use crate::record::{FlowLogRecord, FlowLogRecords};
use crate::Result;

/// One converted flow-log document.
#[derive(Debug)]
pub struct ConvertedDocument {
    /// The document as compact JSON
    pub message: String,
    /// The document's encoded IPFIX packet
    pub encoded: EncodeOutcome,
}

impl ConvertedDocument {
    pub fn into_payload(self, tenant_id: u32) -> RelayPayload {
        RelayPayload::new(self.message, self.encoded.into_text(), tenant_id)
    }
}

/// Converts flow-log documents into (message, encoded packet) pairs.
///
/// Every document becomes one IPFIX message. The converter numbers messages
/// with the IPFIX sequence number: the count of data records it has exported
/// before the current message.
#[derive(Debug, Clone)]
pub struct FlowLogConverter {
    encoder: FlowEncoder,
    exported_records: u32,
}

impl FlowLogConverter {
    pub fn new(options: &ExportOptions) -> Result<Self> {
        Ok(Self {
            encoder: FlowEncoder::new(options)?,
            exported_records: 0,
        })
    }

    /// Start numbering from `sequence_number` instead of zero.
    pub fn with_sequence_number(mut self, sequence_number: u32) -> Self {
        self.exported_records = sequence_number;
        self
    }

    /// Sequence number the next message will carry.
    pub fn sequence_number(&self) -> u32 {
        self.exported_records
    }

    /// Convert one document, stamping the packet with the current time.
    pub fn convert_record(&mut self, record: &FlowLogRecord) -> Result<ConvertedDocument> {
        let context = PacketContext::now(self.exported_records);
        self.convert_record_with(record, context.export_time)
    }

    /// Convert one document with a fixed export time.
    pub fn convert_record_with(
        &mut self,
        record: &FlowLogRecord,
        export_time: u32,
    ) -> Result<ConvertedDocument> {
        let message = record.to_message()?;
        let context = PacketContext::new(export_time, self.exported_records);

        let encoded = self.encoder.encode(record.flow_records(), context);
        self.exported_records = self
            .exported_records
            .wrapping_add(encoded.record_count() as u32);

        Ok(ConvertedDocument { message, encoded })
    }

    /// Convert every document of a flow-log blob, in order.
    ///
    /// A blob that is not valid JSON is an error. Documents whose tuples fail
    /// to encode still produce an entry, with an empty encoded packet.
    pub fn convert(&mut self, content: &str) -> Result<Vec<ConvertedDocument>> {
        let logs = FlowLogRecords::from_json(content)?;
        logs.records
            .iter()
            .map(|record| self.convert_record(record))
            .collect()
    }

    /// Convert a blob straight into relay payloads for `tenant_id`.
    pub fn relay_payloads(&mut self, content: &str, tenant_id: u32) -> Result<Vec<RelayPayload>> {
        let documents = self.convert(content)?;
        let mut payloads = Vec::with_capacity(documents.len());
        for document in documents {
            if let Some(e) = document.encoded.failure() {
                log::warn!("Relaying document without encoded flows: {}", e);
            }
            payloads.push(document.into_payload(tenant_id));
        }
        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FormatVersion};

    const BLOB: &str = r#"{"records":[
        {"time":"2020-01-01T00:00:00Z","category":"NetworkSecurityGroupFlowEvent",
         "resourceId":"/SUBSCRIPTIONS/X","operationName":"NetworkSecurityGroupFlowEvents",
         "properties":{"Version":2,"flows":[{"rule":"r1","flows":[{"mac":"000D3AF87856",
           "flowTuples":["1577836800,10.0.0.4,10.0.0.5,1234,443,T,I,C,10,1000,5,500",
                         "1577836801,10.0.0.4,10.0.0.6,1235,443,U,O,E,1,2,3,4"]}]}]}},
        {"time":"2020-01-01T00:01:00Z","category":"NetworkSecurityGroupFlowEvent",
         "resourceId":"/SUBSCRIPTIONS/X","operationName":"NetworkSecurityGroupFlowEvents",
         "properties":{"Version":2,"flows":[]}},
        {"time":"2020-01-01T00:02:00Z","category":"NetworkSecurityGroupFlowEvent",
         "resourceId":"/SUBSCRIPTIONS/X","operationName":"NetworkSecurityGroupFlowEvents",
         "properties":{"Version":2,"flows":[{"rule":"r1","flows":[{"mac":"000D3AF87856",
           "flowTuples":["1577836900,10.0.0.4,10.0.0.5,1234,443,T,I,B,,,,"]}]}]}}
    ]}"#;

    fn converter() -> FlowLogConverter {
        FlowLogConverter::new(&ExportOptions::default()).unwrap()
    }

    #[test]
    fn test_one_result_per_document() {
        let documents = converter().convert(BLOB).unwrap();
        assert_eq!(documents.len(), 3);

        assert_eq!(documents[0].encoded.record_count(), 2);
        assert!(matches!(documents[1].encoded, EncodeOutcome::Empty));
        assert_eq!(documents[2].encoded.record_count(), 1);
        assert!(documents[0].message.contains("\"Version\":2"));
    }

    #[test]
    fn test_sequence_number_counts_exported_records() {
        let mut converter = converter().with_sequence_number(10);
        let documents = converter.convert(BLOB).unwrap();
        assert_eq!(converter.sequence_number(), 13);

        // sequence number sits at bytes 8..12 of the header
        let packet = packet_bytes(&documents[2].encoded);
        assert_eq!(u32::from_be_bytes(packet[8..12].try_into().unwrap()), 12);
    }

    #[test]
    fn test_sequence_number_wraps() {
        let mut converter = converter().with_sequence_number(u32::MAX);
        converter.convert(BLOB).unwrap();
        assert_eq!(converter.sequence_number(), 2);
    }

    #[test]
    fn test_fixed_export_time_is_reproducible() {
        let logs = FlowLogRecords::from_json(BLOB).unwrap();
        let first = converter().convert_record_with(&logs.records[0], 1_600_000_000).unwrap();
        let second = converter().convert_record_with(&logs.records[0], 1_600_000_000).unwrap();
        assert_eq!(first.encoded.text(), second.encoded.text());
        assert_eq!(first.message, second.message);
    }

    #[test]
    fn test_failed_document_keeps_message() {
        let mut record = FlowLogRecords::from_json(BLOB).unwrap().records.remove(0);
        record.properties.flows[0].flows[0]
            .flow_tuples
            .push("1577836802,10.0.0.4,10.0.0.5,1,2,G,I,C,1,2,3,4".to_string());

        let mut converter = converter();
        let document = converter.convert_record_with(&record, 0).unwrap();
        assert!(document.encoded.is_failed());
        assert!(document.message.contains("G,I,C"));
        assert_eq!(converter.sequence_number(), 0);

        let payload = document.into_payload(7);
        assert_eq!(payload.message_encoded, "");
        assert_eq!(payload.tenant_id, 7);
    }

    #[test]
    fn test_unknown_flow_state_is_encoded() {
        let mut record = FlowLogRecords::from_json(BLOB).unwrap().records.remove(0);
        record.properties.flows[0].flows[0].flow_tuples = vec![
            "1577836800,10.0.0.4,10.0.0.5,1234,443,T,I,A,C,10,1000,5,500".to_string(),
            "1577836801,10.0.0.4,10.0.0.5,1234,443,T,I,A,D,10,1000,5,500".to_string(),
        ];

        let document = converter().convert_record_with(&record, 0).unwrap();
        assert!(!document.encoded.is_failed());
        assert_eq!(document.encoded.record_count(), 2);

        // input packets and bytes of the second record
        let packet = packet_bytes(&document.encoded);
        let second = 16 + 48 + 4 + 61;
        assert_eq!(u32::from_be_bytes(packet[second + 13..second + 17].try_into().unwrap()), 10);
        assert_eq!(u32::from_be_bytes(packet[second + 17..second + 21].try_into().unwrap()), 1000);
    }

    #[test]
    fn test_oversized_document_reports_cause() {
        let mut record = FlowLogRecords::from_json(BLOB).unwrap().records.remove(0);
        let first = converter().convert_record_with(&record, 0).unwrap();
        assert!(first.encoded.failure().is_none());

        // 1073 records fill a message; one more cannot be expressed
        record.properties.flows[0].flows[0].flow_tuples =
            vec!["1577836800,10.0.0.4,10.0.0.5,1234,443,T,I,C,10,1000,5,500".to_string(); 1074];

        let document = converter().convert_record_with(&record, 0).unwrap();
        assert!(matches!(
            document.encoded.failure(),
            Some(Error::MessageTooLarge(65582))
        ));
    }

    #[test]
    fn test_invalid_blob_is_an_error() {
        assert!(converter().convert("not json").is_err());
    }

    #[test]
    fn test_relay_payloads() {
        let payloads = converter().relay_payloads(BLOB, 1234).unwrap();
        assert_eq!(payloads.len(), 3);
        assert!(!payloads[0].message_encoded.is_empty());
        assert_eq!(payloads[1].message_encoded, "");
        assert_eq!(payloads[2].external_id, "00000000-0000-0000-0000-000000001234");
        assert_eq!(
            serde_json::from_str::<FlowLogRecord>(&payloads[0].message)
                .unwrap()
                .version(),
            FormatVersion::V2
        );
    }

    fn packet_bytes(outcome: &EncodeOutcome) -> Vec<u8> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;
        STANDARD.decode(outcome.text()).unwrap()
    }
}
