//! IPFIX wire format constants and headers (RFC 7011).
//!
//! All multi-byte values are written in network byte order.

use std::fmt;

/// Protocol version written in every message header.
pub const IPFIX_VERSION: u16 = 10;

/// Message header size in bytes.
pub const MESSAGE_HEADER_SIZE: usize = 16;

/// Set header size in bytes (set id + length).
pub const SET_HEADER_SIZE: usize = 4;

/// Template record header size in bytes (template id + field count).
pub const TEMPLATE_RECORD_HEADER_SIZE: usize = 4;

/// Size of a field specifier without enterprise number.
pub const FIELD_SPECIFIER_SIZE: usize = 4;

/// Set id of a template set.
pub const TEMPLATE_SET_ID: u16 = 2;

/// Lowest set id usable for data sets; template ids share this range.
pub const MIN_DATA_SET_ID: u16 = 256;

/// Largest message expressible in the 16-bit length field.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

/// Information elements used by the flow-log template.
///
/// Numbering follows the NetFlow v9 field types, which IPFIX inherits for
/// ids below 128.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InformationElement {
    /// IN_BYTES / octetDeltaCount
    InputBytes = 1,
    /// IN_PKTS / packetDeltaCount
    InputPackets = 2,
    /// PROTOCOL / protocolIdentifier
    Protocol = 4,
    /// L4_SRC_PORT / sourceTransportPort
    SourcePort = 7,
    /// IPV4_SRC_ADDR / sourceIPv4Address
    SourceIpv4Address = 8,
    /// L4_DST_PORT / destinationTransportPort
    DestinationPort = 11,
    /// IPV4_DST_ADDR / destinationIPv4Address
    DestinationIpv4Address = 12,
    /// LAST_SWITCHED
    LastSwitched = 21,
    /// FIRST_SWITCHED
    FirstSwitched = 22,
    /// IF_NAME / interfaceName
    InterfaceName = 82,
}

impl InformationElement {
    /// Numeric element id written into field specifiers.
    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            InformationElement::InputBytes => "IN_BYTES",
            InformationElement::InputPackets => "IN_PKTS",
            InformationElement::Protocol => "PROTOCOL",
            InformationElement::SourcePort => "L4_SRC_PORT",
            InformationElement::SourceIpv4Address => "IPV4_SRC_ADDR",
            InformationElement::DestinationPort => "L4_DST_PORT",
            InformationElement::DestinationIpv4Address => "IPV4_DST_ADDR",
            InformationElement::LastSwitched => "LAST_SWITCHED",
            InformationElement::FirstSwitched => "FIRST_SWITCHED",
            InformationElement::InterfaceName => "IF_NAME",
        }
    }
}

impl fmt::Display for InformationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id())
    }
}

/// Message header (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Always `IPFIX_VERSION`
    pub version: u16,
    /// Total message length including this header
    pub length: u16,
    /// Export time, seconds since the Unix epoch
    pub export_time: u32,
    /// Data records sent before this message, modulo 2^32
    pub sequence_number: u32,
    pub observation_domain_id: u32,
}

impl MessageHeader {
    /// Create a header with the length still unset.
    pub fn new(export_time: u32, sequence_number: u32, observation_domain_id: u32) -> Self {
        Self {
            version: IPFIX_VERSION,
            length: 0,
            export_time,
            sequence_number,
            observation_domain_id,
        }
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf.extend_from_slice(&self.length.to_be_bytes());
        buf.extend_from_slice(&self.export_time.to_be_bytes());
        buf.extend_from_slice(&self.sequence_number.to_be_bytes());
        buf.extend_from_slice(&self.observation_domain_id.to_be_bytes());
    }
}

/// Set header (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeader {
    pub set_id: u16,
    /// Set length including this header
    pub length: u16,
}

impl SetHeader {
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.set_id.to_be_bytes());
        buf.extend_from_slice(&self.length.to_be_bytes());
    }
}
