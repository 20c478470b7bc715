//! Flow tuple parsing.
//!
//! A flow tuple is one comma separated line inside an interface group:
//!
//! ```text
//! version 1: time,src,dst,sport,dport,proto,dir,decision
//! version 2: time,src,dst,sport,dport,proto,dir,decision,state,pkts_sd,bytes_sd,pkts_ds,bytes_ds
//! ```
//!
//! Version 2 tuples without the decision column (12 fields) are accepted as well;
//! the field count selects the layout.

mod fields;

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::error::TupleError;
use crate::FormatVersion;

pub use fields::{Decision, Direction, FlowState, TransportProtocol, PROTOCOL_TCP, PROTOCOL_UDP};

/// Fields in a version 1 tuple.
pub const V1_FIELD_COUNT: usize = 8;

/// Fields in a version 2 tuple.
pub const V2_FIELD_COUNT: usize = 13;

/// Fields in a version 2 tuple that omits the decision column.
pub const V2_COMPACT_FIELD_COUNT: usize = 12;

/// Per-direction counters of a version 2 tuple.
///
/// Counters are empty while a flow is in the begin state, so each one is
/// optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlowCounters {
    pub packets_src_to_dst: Option<u32>,
    pub bytes_src_to_dst: Option<u32>,
    pub packets_dst_to_src: Option<u32>,
    pub bytes_dst_to_src: Option<u32>,
}

/// Decoded fields of one flow tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowTuple {
    /// Format version the tuple was parsed with
    pub version: FormatVersion,
    /// Unix timestamp (seconds) of the observation
    pub start_time: u32,
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: TransportProtocol,
    pub direction: Direction,
    /// Absent in compact version 2 tuples
    pub decision: Option<Decision>,
    /// Present only for version 2 and later
    pub flow_state: Option<FlowState>,
    /// Present only for version 2 and later
    pub counters: Option<FlowCounters>,
}

impl FlowTuple {
    /// Parse a raw tuple with the schema of `version`.
    ///
    /// Unparseable addresses become `0.0.0.0` and unparseable ports become `0`.
    /// Unknown flow state markers are kept as [`FlowState::Other`]. The start
    /// time and non-empty counters must be well formed.
    pub fn parse(raw: &str, version: FormatVersion) -> Result<Self, TupleError> {
        let fields: Vec<&str> = raw.split(',').collect();
        let extended = version.has_flow_state();
        let required = if extended {
            V2_COMPACT_FIELD_COUNT
        } else {
            V1_FIELD_COUNT
        };
        if fields.len() < required {
            return Err(TupleError::FieldCount {
                expected: required,
                actual: fields.len(),
                tuple: raw.to_string(),
            });
        }

        let start_time = fields[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| TupleError::InvalidStartTime(fields[0].to_string()))?;

        let mut tuple = FlowTuple {
            version,
            start_time,
            source_address: parse_address(fields[1]),
            destination_address: parse_address(fields[2]),
            source_port: parse_port(fields[3]),
            destination_port: parse_port(fields[4]),
            protocol: TransportProtocol::from_code(fields[5]),
            direction: Direction::from_code_lossy(fields[6]),
            decision: None,
            flow_state: None,
            counters: None,
        };

        if !extended {
            tuple.decision = Decision::from_code(fields[7]);
            return Ok(tuple);
        }

        let state_index = if fields.len() >= V2_FIELD_COUNT {
            tuple.decision = Decision::from_code(fields[7]);
            8
        } else {
            7
        };
        tuple.flow_state = Some(FlowState::from_code_lossy(fields[state_index]));

        let counters = &fields[state_index + 1..state_index + 5];
        tuple.counters = Some(FlowCounters {
            packets_src_to_dst: parse_counter("packets_src_to_dst", counters[0])?,
            bytes_src_to_dst: parse_counter("bytes_src_to_dst", counters[1])?,
            packets_dst_to_src: parse_counter("packets_dst_to_src", counters[2])?,
            bytes_dst_to_src: parse_counter("bytes_dst_to_src", counters[3])?,
        });

        Ok(tuple)
    }
}

/// Parse an IPv4 address, falling back to `0.0.0.0`.
pub fn parse_address(text: &str) -> Ipv4Addr {
    text.trim().parse().unwrap_or(Ipv4Addr::UNSPECIFIED)
}

/// Parse a transport port, falling back to `0`.
pub fn parse_port(text: &str) -> u16 {
    text.trim().parse().unwrap_or(0)
}

fn parse_counter(field: &'static str, text: &str) -> Result<Option<u32>, TupleError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u32>()
        .map(Some)
        .map_err(|_| TupleError::InvalidCounter {
            field,
            value: text.to_string(),
        })
}
