//! nsgflow - Network security group flow logs to IPFIX.
//!
//! This crate flattens the nested flow-log documents written by network
//! security group flow logging into individual flow records and re-encodes each
//! document as a single IPFIX message, carried downstream as base64 text.
//!
//! # Features
//!
//! - **Version-aware tuple parsing**: version 1 and version 2 flow tuples
//! - **Direction-aware counters**: inbound and outbound flows both report
//!   through the input packet/byte fields
//! - **Byte-exact IPFIX export**: header, template set and data set with
//!   lengths computed from the finished content
//! - **Batch error boundary**: a bad tuple drops its document's packet, never
//!   the whole blob
//!
//! # Quick Start
//!
//! ```ignore
//! use nsgflow::{ExportOptions, FlowLogConverter};
//!
//! let mut converter = FlowLogConverter::new(&ExportOptions::default())?;
//! for document in converter.convert(&blob)? {
//!     println!("{}", document.encoded.text());
//! }
//! ```
//!
//! # Flow Record Layout
//!
//! Each data record is 61 bytes, in network byte order:
//!
//! | Field              | Bytes |
//! |--------------------|-------|
//! | source address     | 4     |
//! | source port        | 2     |
//! | destination address| 4     |
//! | destination port   | 2     |
//! | protocol           | 1     |
//! | input packets      | 4     |
//! | input bytes        | 4     |
//! | first switched     | 4     |
//! | last switched      | 4     |
//! | interface name     | 32    |

mod counters;
mod error;
mod input;
mod version;

pub mod config;
pub mod denormalize;
pub mod encoder;
pub mod ipfix;
pub mod payload;
pub mod pipeline;
pub mod record;
pub mod tuple;

// Re-export core types
pub use error::{Error, Result, TupleError};
pub use version::FormatVersion;

pub use counters::{resolve_counters, ResolvedCounters};
pub use denormalize::{FlowRecord, FlowRecords};
pub use encoder::{protocol_identifier, EncodeOutcome, FlowEncoder, PacketContext};
pub use record::{FlowLogRecord, FlowLogRecords, InterfaceGroup, RuleGroup};
pub use tuple::{Direction, FlowState, FlowTuple, TransportProtocol};

// Re-export configuration and envelope
pub use config::{ExportOptions, Settings};
pub use payload::RelayPayload;
pub use pipeline::{ConvertedDocument, FlowLogConverter};

// Re-export input helpers
pub use input::{decode_flow_log, read_flow_log};
