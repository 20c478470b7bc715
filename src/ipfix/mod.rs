//! IPFIX export packet encoding.
//!
//! A flow-log batch is exported as one self-describing message: the template
//! travels with the data it describes.
//!
//! # Message Structure
//!
//! ```text
//! +----------------------+
//! |   MESSAGE HEADER     |  16 bytes: version 10, length, export time,
//! |                      |  sequence number, observation domain
//! +----------------------+
//! |   TEMPLATE SET       |  set id 2: one template record
//! +----------------------+
//! |   DATA SET           |  set id = template id: N fixed-width records
//! +----------------------+
//! ```

mod format;
mod template;
mod writer;


pub use format::*;
pub use template::{
    DataRecord, DataRecordBuilder, ExportTemplate, FieldSpecifier, FLOW_LOG_RECORD_LENGTH,
    INTERFACE_NAME_LENGTH,
};
pub use writer::PacketWriter;
