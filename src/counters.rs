//! Direction-aware packet and byte counter resolution.

use crate::error::TupleError;
use crate::tuple::{Direction, FlowTuple};

/// Packet and byte counts exported for one flow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedCounters {
    pub packets: u32,
    pub bytes: u32,
}

impl ResolvedCounters {
    pub const ZERO: ResolvedCounters = ResolvedCounters {
        packets: 0,
        bytes: 0,
    };

    pub fn new(packets: u32, bytes: u32) -> Self {
        Self { packets, bytes }
    }
}

/// Resolve the counters reported for a tuple.
///
/// Inbound flows report the source-to-destination counters and outbound flows
/// the destination-to-source counters. Both end up in the template's single
/// pair of input counter fields.
///
/// Tuples older than version 2 carry no counters and resolve to zero, as do
/// flows in the begin state.
pub fn resolve_counters(tuple: &FlowTuple) -> Result<ResolvedCounters, TupleError> {
    if !tuple.version.has_flow_state() {
        log::warn!("Only version 2 supported, got version {}", tuple.version);
        return Ok(ResolvedCounters::ZERO);
    }

    let (Some(state), Some(counters)) = (&tuple.flow_state, tuple.counters) else {
        return Ok(ResolvedCounters::ZERO);
    };

    if state.is_begin() {
        return Ok(ResolvedCounters::ZERO);
    }

    let resolved = match tuple.direction {
        Direction::Inbound => ResolvedCounters {
            packets: counters
                .packets_src_to_dst
                .ok_or(TupleError::MissingCounter("packets_src_to_dst"))?,
            bytes: counters
                .bytes_src_to_dst
                .ok_or(TupleError::MissingCounter("bytes_src_to_dst"))?,
        },
        Direction::Outbound => ResolvedCounters {
            packets: counters
                .packets_dst_to_src
                .ok_or(TupleError::MissingCounter("packets_dst_to_src"))?,
            bytes: counters
                .bytes_dst_to_src
                .ok_or(TupleError::MissingCounter("bytes_dst_to_src"))?,
        },
    };

    Ok(resolved)
}
