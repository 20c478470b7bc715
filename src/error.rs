//! Error types for nsgflow.

use thiserror::Error;

use crate::ipfix::InformationElement;

/// Error type for nsgflow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A flow tuple could not be parsed or its counters resolved
    #[error("flow tuple error: {0}")]
    Tuple(#[from] TupleError),

    /// Transport protocol marker other than TCP or UDP
    #[error("unsupported transport protocol: {0:?}")]
    UnsupportedProtocol(String),

    /// Template id collides with the reserved set id range
    #[error("invalid template id {0}: ids below 256 are reserved")]
    InvalidTemplateId(u16),

    /// Value written to a data record does not match the template field
    #[error("field {element} of template {template_id} is {expected} bytes, got {actual}")]
    FieldWidth {
        template_id: u16,
        element: InformationElement,
        expected: usize,
        actual: usize,
    },

    /// Data record is missing fields or has fields beyond the template
    #[error("data record for template {template_id} has {filled} of {expected} fields")]
    IncompleteRecord {
        template_id: u16,
        filled: usize,
        expected: usize,
    },

    /// Value written after every template field was already filled
    #[error("data record for template {template_id} already has all {expected} fields")]
    RecordOverflow { template_id: u16, expected: usize },

    /// Data record packed against a different template than its data set
    #[error("data set for template {expected} got a record of template {actual}")]
    TemplateMismatch { expected: u16, actual: u16 },

    /// Data record length differs from the template's record length
    #[error("data record for template {template_id} is {actual} bytes, expected {expected}")]
    RecordLength {
        template_id: u16,
        expected: usize,
        actual: usize,
    },

    /// Message or set does not fit a 16-bit length field
    #[error("message too large: {0} bytes exceeds the 65535 byte limit")]
    MessageTooLarge(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for nsgflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for flow tuple parsing and counter resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TupleError {
    /// Fewer comma separated fields than the schema requires
    #[error("expected at least {expected} fields, got {actual}: {tuple:?}")]
    FieldCount {
        expected: usize,
        actual: usize,
        tuple: String,
    },

    /// Start time is not an unsigned 32-bit epoch timestamp
    #[error("invalid start time: {0:?}")]
    InvalidStartTime(String),

    /// Counter text is not an unsigned 32-bit integer
    #[error("invalid {field} counter: {value:?}")]
    InvalidCounter { field: &'static str, value: String },

    /// Counter required for the flow direction is empty
    #[error("missing {0} counter")]
    MissingCounter(&'static str),
}
