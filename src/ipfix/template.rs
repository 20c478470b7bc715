//! Export templates and the data records packed against them.

use std::net::Ipv4Addr;

use super::format::*;
use crate::{Error, Result};

/// Width of the interface name field.
pub const INTERFACE_NAME_LENGTH: u16 = 32;

/// Width of one flow-log data record.
pub const FLOW_LOG_RECORD_LENGTH: usize = 61;

/// One (element, width) pair of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpecifier {
    pub element: InformationElement,
    pub length: u16,
}

/// Ordered list of fixed-width fields describing a data record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTemplate {
    id: u16,
    fields: Vec<FieldSpecifier>,
}

impl ExportTemplate {
    /// Create an empty template.
    ///
    /// Ids below 256 are set ids and cannot name a template.
    pub fn new(id: u16) -> Result<Self> {
        if id < MIN_DATA_SET_ID {
            return Err(Error::InvalidTemplateId(id));
        }
        Ok(Self {
            id,
            fields: Vec::new(),
        })
    }

    /// Append a field.
    pub fn field(mut self, element: InformationElement, length: u16) -> Self {
        self.fields.push(FieldSpecifier { element, length });
        self
    }

    /// The flow-log template.
    ///
    /// Packet and byte counts always go to the input counters, whatever the
    /// flow direction. The source carries a single timestamp, so first and
    /// last switched hold the same value.
    pub fn flow_log(id: u16) -> Result<Self> {
        use InformationElement::*;

        Ok(Self::new(id)?
            .field(SourceIpv4Address, 4)
            .field(SourcePort, 2)
            .field(DestinationIpv4Address, 4)
            .field(DestinationPort, 2)
            .field(Protocol, 1)
            .field(InputPackets, 4)
            .field(InputBytes, 4)
            .field(FirstSwitched, 4)
            .field(LastSwitched, 4)
            .field(InterfaceName, INTERFACE_NAME_LENGTH))
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn fields(&self) -> &[FieldSpecifier] {
        &self.fields
    }

    /// Width of one data record in bytes.
    pub fn record_length(&self) -> usize {
        self.fields.iter().map(|f| f.length as usize).sum()
    }

    /// Size of the encoded template record.
    pub fn encoded_len(&self) -> usize {
        TEMPLATE_RECORD_HEADER_SIZE + self.fields.len() * FIELD_SPECIFIER_SIZE
    }

    /// Append the template record (header + field specifiers) to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            buf.extend_from_slice(&field.element.id().to_be_bytes());
            buf.extend_from_slice(&field.length.to_be_bytes());
        }
    }

    /// Start packing a data record against this template.
    pub fn record(&self) -> DataRecordBuilder<'_> {
        DataRecordBuilder {
            template: self,
            buf: Vec::with_capacity(self.record_length()),
            next_field: 0,
        }
    }
}

/// One packed data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    template_id: u16,
    bytes: Vec<u8>,
}

impl DataRecord {
    pub fn template_id(&self) -> u16 {
        self.template_id
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Writes field values in template order.
///
/// Every value must match the width of the next template field, and
/// [`finish`](Self::finish) rejects records with unfilled fields.
pub struct DataRecordBuilder<'t> {
    template: &'t ExportTemplate,
    buf: Vec<u8>,
    next_field: usize,
}

impl<'t> DataRecordBuilder<'t> {
    fn current(&self) -> Result<FieldSpecifier> {
        self.template
            .fields
            .get(self.next_field)
            .copied()
            .ok_or(Error::RecordOverflow {
                template_id: self.template.id,
                expected: self.template.fields.len(),
            })
    }

    fn push(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let field = self.current()?;
        if bytes.len() != field.length as usize {
            return Err(Error::FieldWidth {
                template_id: self.template.id,
                element: field.element,
                expected: field.length as usize,
                actual: bytes.len(),
            });
        }
        self.buf.extend_from_slice(bytes);
        self.next_field += 1;
        Ok(self)
    }

    pub fn ipv4(&mut self, addr: Ipv4Addr) -> Result<&mut Self> {
        self.push(&addr.octets())
    }

    pub fn u8(&mut self, value: u8) -> Result<&mut Self> {
        self.push(&[value])
    }

    pub fn u16(&mut self, value: u16) -> Result<&mut Self> {
        self.push(&value.to_be_bytes())
    }

    pub fn u32(&mut self, value: u32) -> Result<&mut Self> {
        self.push(&value.to_be_bytes())
    }

    /// Write a string into the current field, truncated on a character
    /// boundary or zero-padded to the field width.
    pub fn text(&mut self, value: &str) -> Result<&mut Self> {
        let width = self.current()?.length as usize;
        let mut end = value.len().min(width);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        let mut field = vec![0u8; width];
        field[..end].copy_from_slice(&value.as_bytes()[..end]);
        self.push(&field)
    }

    /// Finish the record; all template fields must have been written.
    pub fn finish(&mut self) -> Result<DataRecord> {
        if self.next_field != self.template.fields.len() {
            return Err(Error::IncompleteRecord {
                template_id: self.template.id,
                filled: self.next_field,
                expected: self.template.fields.len(),
            });
        }
        Ok(DataRecord {
            template_id: self.template.id,
            bytes: std::mem::take(&mut self.buf),
        })
    }
}
