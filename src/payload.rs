//! Relay payload wrapping each flow-log document.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Message type understood by the relay.
pub const MESSAGE_TYPE: &str = "azure-nsg-flows";

/// Tag attached to every relayed payload.
pub const RELAY_TAG: &str = "relayed";

/// Payload sent downstream for one flow-log document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    /// GUID form of the tenant id
    pub external_id: String,
    /// The original document as compact JSON
    pub message: String,
    /// Base64 IPFIX packet, empty when nothing could be encoded
    pub message_encoded: String,
    pub tenant_id: u32,
}

impl RelayPayload {
    pub fn new(message: impl Into<String>, message_encoded: impl Into<String>, tenant_id: u32) -> Self {
        Self {
            tags: vec![RELAY_TAG.to_string()],
            message_type: MESSAGE_TYPE.to_string(),
            external_id: external_id(tenant_id),
            message: message.into(),
            message_encoded: message_encoded.into(),
            tenant_id,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// GUID form of a tenant id: the id zero-padded to 32 decimal digits and
/// grouped 8-4-4-4-12.
pub fn external_id(tenant_id: u32) -> String {
    let digits = format!("{:032}", tenant_id);
    format!(
        "{}-{}-{}-{}-{}",
        &digits[0..8],
        &digits[8..12],
        &digits[12..16],
        &digits[16..20],
        &digits[20..32]
    )
}
