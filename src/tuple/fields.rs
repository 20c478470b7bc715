//! Single-letter markers used inside flow tuples.

use std::fmt;

use serde::Serialize;

/// IANA protocol number for TCP.
pub const PROTOCOL_TCP: u8 = 6;

/// IANA protocol number for UDP.
pub const PROTOCOL_UDP: u8 = 17;

/// Traffic direction relative to the interface that logged the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Traffic arriving at the interface (`I`)
    Inbound,
    /// Traffic leaving the interface (`O`)
    Outbound,
}

impl Direction {
    /// Parse a direction marker.
    ///
    /// Only `I` is inbound; every other marker is read as outbound.
    pub fn from_code_lossy(code: &str) -> Self {
        if code.trim() == "I" {
            Direction::Inbound
        } else {
            Direction::Outbound
        }
    }

    /// Get the marker as written in flow tuples.
    pub fn as_code(&self) -> &'static str {
        match self {
            Direction::Inbound => "I",
            Direction::Outbound => "O",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Whether the security rule allowed or denied the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Parse a decision marker, `None` for anything other than `A` or `D`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(Decision::Allow),
            "D" => Some(Decision::Deny),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Decision::Allow => "A",
            Decision::Deny => "D",
        }
    }
}

/// Lifecycle marker of a version 2 flow tuple.
///
/// Only the begin state changes how a tuple is exported; unknown markers are
/// kept verbatim and treated like any other non-begin state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FlowState {
    /// Flow was created; no packets have been counted yet (`B`)
    Begin,
    /// Flow is ongoing; counters cover the last interval (`C`)
    Continuing,
    /// Flow was terminated (`E`)
    End,
    /// Any other marker, verbatim
    Other(String),
}

impl FlowState {
    /// Parse a flow state marker.
    pub fn from_code_lossy(code: &str) -> Self {
        match code.trim() {
            "B" => FlowState::Begin,
            "C" => FlowState::Continuing,
            "E" => FlowState::End,
            other => FlowState::Other(other.to_string()),
        }
    }

    pub fn is_begin(&self) -> bool {
        matches!(self, FlowState::Begin)
    }

    pub fn as_code(&self) -> &str {
        match self {
            FlowState::Begin => "B",
            FlowState::Continuing => "C",
            FlowState::End => "E",
            FlowState::Other(code) => code,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Transport protocol marker of a flow tuple.
///
/// Unknown markers are kept as-is; they only become an error when a record is
/// encoded, since the export template has no slot for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TransportProtocol {
    /// `T`
    Tcp,
    /// `U`
    Udp,
    /// Any other marker, verbatim
    Other(String),
}

impl TransportProtocol {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "T" => TransportProtocol::Tcp,
            "U" => TransportProtocol::Udp,
            other => TransportProtocol::Other(other.to_string()),
        }
    }

    /// IANA protocol number, `None` for unknown markers.
    pub fn protocol_number(&self) -> Option<u8> {
        match self {
            TransportProtocol::Tcp => Some(PROTOCOL_TCP),
            TransportProtocol::Udp => Some(PROTOCOL_UDP),
            TransportProtocol::Other(_) => None,
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            TransportProtocol::Tcp => "T",
            TransportProtocol::Udp => "U",
            TransportProtocol::Other(code) => code,
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}
