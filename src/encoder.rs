//! Flow record to IPFIX packet encoding.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::ExportOptions;
use crate::counters::resolve_counters;
use crate::denormalize::FlowRecord;
use crate::error::TupleError;
use crate::ipfix::{DataRecord, ExportTemplate, PacketWriter};
use crate::tuple::TransportProtocol;
use crate::{Error, Result};

/// Per-message header values chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketContext {
    /// Seconds since the Unix epoch
    pub export_time: u32,
    pub sequence_number: u32,
}

impl PacketContext {
    pub fn new(export_time: u32, sequence_number: u32) -> Self {
        Self {
            export_time,
            sequence_number,
        }
    }

    /// Context stamped with the current time.
    pub fn now(sequence_number: u32) -> Self {
        let export_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        Self::new(export_time, sequence_number)
    }
}

/// Result of encoding one batch.
#[derive(Debug)]
pub enum EncodeOutcome {
    /// Base64 text of the packet and the number of data records in it
    Encoded { text: String, records: usize },
    /// The batch had no records; no packet was built
    Empty,
    /// The batch was dropped
    Failed(Error),
}

impl EncodeOutcome {
    /// Encoded text, empty unless a packet was built.
    pub fn text(&self) -> &str {
        match self {
            EncodeOutcome::Encoded { text, .. } => text,
            EncodeOutcome::Empty | EncodeOutcome::Failed(_) => "",
        }
    }

    pub fn into_text(self) -> String {
        match self {
            EncodeOutcome::Encoded { text, .. } => text,
            EncodeOutcome::Empty | EncodeOutcome::Failed(_) => String::new(),
        }
    }

    /// Data records carried by the packet.
    pub fn record_count(&self) -> usize {
        match self {
            EncodeOutcome::Encoded { records, .. } => *records,
            EncodeOutcome::Empty | EncodeOutcome::Failed(_) => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EncodeOutcome::Failed(_))
    }

    /// Why the batch was dropped, if it was.
    pub fn failure(&self) -> Option<&Error> {
        match self {
            EncodeOutcome::Failed(e) => Some(e),
            EncodeOutcome::Encoded { .. } | EncodeOutcome::Empty => None,
        }
    }
}

/// Map a transport marker to its IANA protocol number.
pub fn protocol_identifier(protocol: &TransportProtocol) -> Result<u8> {
    protocol
        .protocol_number()
        .ok_or_else(|| Error::UnsupportedProtocol(protocol.as_code().to_string()))
}

/// Encodes flow records against the fixed flow-log template.
///
/// Holds no mutable state; one encoder can serve any number of batches from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct FlowEncoder {
    template: ExportTemplate,
    observation_domain_id: u32,
}

impl FlowEncoder {
    pub fn new(options: &ExportOptions) -> Result<Self> {
        Ok(Self {
            template: ExportTemplate::flow_log(options.template_id)?,
            observation_domain_id: options.observation_domain_id,
        })
    }

    /// Pack one record in template order.
    pub fn encode_record(&self, record: &FlowRecord<'_>) -> Result<DataRecord> {
        let tuple = &record.tuple;
        let protocol = protocol_identifier(&tuple.protocol)?;
        let counters = resolve_counters(tuple)?;

        self.template
            .record()
            .ipv4(tuple.source_address)?
            .u16(tuple.source_port)?
            .ipv4(tuple.destination_address)?
            .u16(tuple.destination_port)?
            .u8(protocol)?
            .u32(counters.packets)?
            .u32(counters.bytes)?
            .u32(tuple.start_time)?
            .u32(tuple.start_time)?
            .text(record.mac)?
            .finish()
    }

    /// Build the binary packet for a batch, `None` for an empty batch.
    pub fn encode_packet(
        &self,
        records: &[FlowRecord<'_>],
        context: PacketContext,
    ) -> Result<Option<Vec<u8>>> {
        if records.is_empty() {
            return Ok(None);
        }

        let data = records
            .iter()
            .map(|record| self.encode_record(record))
            .collect::<Result<Vec<_>>>()?;

        let mut writer = PacketWriter::new(
            context.export_time,
            context.sequence_number,
            self.observation_domain_id,
        );
        writer.add_template_set(&self.template);
        writer.add_data_set(&self.template, &data)?;
        writer.build().map(Some)
    }

    /// Encode a batch of already flattened records as base64 text.
    ///
    /// Any failure drops the whole batch; the error and the batch are logged.
    pub fn encode_batch(&self, records: &[FlowRecord<'_>], context: PacketContext) -> EncodeOutcome {
        log::debug!("Start of IPFIX conversion: {} flow records", records.len());

        match self.encode_packet(records, context) {
            Ok(Some(packet)) => {
                let text = STANDARD.encode(&packet);
                log::debug!("End of IPFIX conversion: {}", text);
                EncodeOutcome::Encoded {
                    text,
                    records: records.len(),
                }
            }
            Ok(None) => {
                log::warn!("Zero records passed to IPFIX conversion");
                EncodeOutcome::Empty
            }
            Err(e) => {
                log::error!(
                    "IPFIX conversion failed for records {}: {}",
                    serde_json::to_string(records).unwrap_or_default(),
                    e
                );
                EncodeOutcome::Failed(e)
            }
        }
    }

    /// Encode the records of one document, as produced by
    /// [`FlowLogRecord::flow_records`](crate::FlowLogRecord::flow_records).
    ///
    /// A tuple that failed to parse fails the batch.
    pub fn encode<'a, I>(&self, records: I, context: PacketContext) -> EncodeOutcome
    where
        I: IntoIterator<Item = std::result::Result<FlowRecord<'a>, TupleError>>,
    {
        let mut batch = Vec::new();
        for record in records {
            match record {
                Ok(record) => batch.push(record),
                Err(e) => {
                    log::error!(
                        "IPFIX conversion failed after {} records {}: {}",
                        batch.len(),
                        serde_json::to_string(&batch).unwrap_or_default(),
                        e
                    );
                    return EncodeOutcome::Failed(e.into());
                }
            }
        }
        self.encode_batch(&batch, context)
    }
}
