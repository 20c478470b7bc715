//! IPFIX message writer.

use super::format::*;
use super::template::{DataRecord, ExportTemplate};
use crate::{Error, Result};

/// Builder for a single IPFIX message.
///
/// Sets are collected as finished bodies; lengths are only computed in
/// [`build`](Self::build), once every set is known.
pub struct PacketWriter {
    header: MessageHeader,
    sets: Vec<SetData>,
}

struct SetData {
    set_id: u16,
    body: Vec<u8>,
}

impl SetData {
    fn encoded_len(&self) -> usize {
        SET_HEADER_SIZE + self.body.len()
    }
}

impl PacketWriter {
    pub fn new(export_time: u32, sequence_number: u32, observation_domain_id: u32) -> Self {
        Self {
            header: MessageHeader::new(export_time, sequence_number, observation_domain_id),
            sets: Vec::new(),
        }
    }

    /// Add a template set holding one template record.
    pub fn add_template_set(&mut self, template: &ExportTemplate) -> &mut Self {
        let mut body = Vec::with_capacity(template.encoded_len());
        template.write_to(&mut body);
        self.sets.push(SetData {
            set_id: TEMPLATE_SET_ID,
            body,
        });
        self
    }

    /// Add a data set for `template`; every record must have been packed
    /// against it.
    pub fn add_data_set(
        &mut self,
        template: &ExportTemplate,
        records: &[DataRecord],
    ) -> Result<&mut Self> {
        let record_length = template.record_length();
        let mut body = Vec::with_capacity(records.len() * record_length);

        for record in records {
            if record.template_id() != template.id() {
                return Err(Error::TemplateMismatch {
                    expected: template.id(),
                    actual: record.template_id(),
                });
            }
            if record.len() != record_length {
                return Err(Error::RecordLength {
                    template_id: template.id(),
                    expected: record_length,
                    actual: record.len(),
                });
            }
            body.extend_from_slice(record.as_bytes());
        }

        self.sets.push(SetData {
            set_id: template.id(),
            body,
        });
        Ok(self)
    }

    /// Build the final message.
    pub fn build(&self) -> Result<Vec<u8>> {
        let total_size = MESSAGE_HEADER_SIZE
            + self.sets.iter().map(SetData::encoded_len).sum::<usize>();
        if total_size > MAX_MESSAGE_SIZE {
            return Err(Error::MessageTooLarge(total_size));
        }

        let mut output = Vec::with_capacity(total_size);

        let mut header = self.header;
        header.length = total_size as u16;
        header.write_to(&mut output);

        for set in &self.sets {
            SetHeader {
                set_id: set.set_id,
                length: set.encoded_len() as u16,
            }
            .write_to(&mut output);
            output.extend_from_slice(&set.body);
        }

        debug_assert_eq!(output.len(), total_size);
        Ok(output)
    }
}
