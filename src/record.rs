//! Flow-log document model.
//!
//! Mirrors the JSON written by network security group flow logging:
//!
//! ```text
//! records[] ─ properties.flows[] (rule) ─ flows[] (mac) ─ flowTuples[]
//! ```

use serde::{Deserialize, Serialize};

use crate::denormalize::FlowRecords;
use crate::{FormatVersion, Result};

/// Root object of a flow-log blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowLogRecords {
    #[serde(default)]
    pub records: Vec<FlowLogRecord>,
}

impl FlowLogRecords {
    /// Parse a flow-log blob.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// One flow-log document: shared metadata plus nested rule groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLogRecord {
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub operation_name: String,
    #[serde(default)]
    pub properties: FlowLogProperties,
}

impl FlowLogRecord {
    pub fn version(&self) -> FormatVersion {
        self.properties.version
    }

    pub fn rule_groups(&self) -> &[RuleGroup] {
        &self.properties.flows
    }

    /// Number of raw tuples across all rule and interface groups.
    pub fn tuple_count(&self) -> usize {
        self.rule_groups()
            .iter()
            .flat_map(|rule| rule.flows.iter())
            .map(|interface| interface.flow_tuples.len())
            .sum()
    }

    /// Flatten the document into one record per tuple, in document order.
    pub fn flow_records(&self) -> FlowRecords<'_> {
        FlowRecords::new(self)
    }

    /// Serialize the document as compact JSON for relaying downstream.
    pub fn to_message(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowLogProperties {
    #[serde(rename = "Version", default)]
    pub version: FormatVersion,
    #[serde(default)]
    pub flows: Vec<RuleGroup>,
}

/// Tuples grouped under the security rule that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub flows: Vec<InterfaceGroup>,
}

/// Tuples observed on one network interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceGroup {
    /// Hardware address of the interface
    #[serde(default)]
    pub mac: String,
    #[serde(rename = "flowTuples", default)]
    pub flow_tuples: Vec<String>,
}
