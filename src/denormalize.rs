//! Flattening of nested flow-log documents into per-tuple records.

use std::iter::FusedIterator;
use std::slice;

use serde::Serialize;

use crate::error::TupleError;
use crate::record::{FlowLogRecord, InterfaceGroup, RuleGroup};
use crate::tuple::FlowTuple;

/// One flow tuple joined with the metadata of the document, rule group and
/// interface group it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord<'a> {
    pub time: &'a str,
    pub category: &'a str,
    pub operation_name: &'a str,
    pub resource_id: &'a str,
    pub rule: &'a str,
    pub mac: &'a str,
    #[serde(flatten)]
    pub tuple: FlowTuple,
}

/// Single-pass iterator over the tuples of a document.
///
/// Yields rule groups in order, interface groups within each rule group in
/// order, and tuples within each interface group in order. Each tuple is parsed
/// with the document's format version; a tuple that does not parse is yielded
/// as an error in its position.
#[derive(Debug, Clone)]
pub struct FlowRecords<'a> {
    document: &'a FlowLogRecord,
    rules: slice::Iter<'a, RuleGroup>,
    interfaces: slice::Iter<'a, InterfaceGroup>,
    tuples: slice::Iter<'a, String>,
    rule: &'a str,
    mac: &'a str,
}

impl<'a> FlowRecords<'a> {
    pub fn new(document: &'a FlowLogRecord) -> Self {
        Self {
            document,
            rules: document.rule_groups().iter(),
            interfaces: Default::default(),
            tuples: Default::default(),
            rule: "",
            mac: "",
        }
    }

    fn enrich(&self, raw: &str) -> Result<FlowRecord<'a>, TupleError> {
        let document = self.document;
        let tuple = FlowTuple::parse(raw, document.version())?;
        Ok(FlowRecord {
            time: &document.time,
            category: &document.category,
            operation_name: &document.operation_name,
            resource_id: &document.resource_id,
            rule: self.rule,
            mac: self.mac,
            tuple,
        })
    }
}

impl<'a> Iterator for FlowRecords<'a> {
    type Item = Result<FlowRecord<'a>, TupleError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.tuples.next() {
                return Some(self.enrich(raw));
            }
            if let Some(interface) = self.interfaces.next() {
                self.mac = &interface.mac;
                self.tuples = interface.flow_tuples.iter();
                continue;
            }
            let rule = self.rules.next()?;
            self.rule = &rule.rule;
            self.interfaces = rule.flows.iter();
        }
    }
}

impl FusedIterator for FlowRecords<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FlowLogProperties, InterfaceGroup, RuleGroup};
    use crate::FormatVersion;

    fn interface(mac: &str, tuples: &[&str]) -> InterfaceGroup {
        InterfaceGroup {
            mac: mac.to_string(),
            flow_tuples: tuples.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn document(version: FormatVersion, flows: Vec<RuleGroup>) -> FlowLogRecord {
        FlowLogRecord {
            time: "2020-01-01T00:00:00Z".to_string(),
            system_id: None,
            category: "NetworkSecurityGroupFlowEvent".to_string(),
            resource_id: "/SUBSCRIPTIONS/X/NSG".to_string(),
            operation_name: "NetworkSecurityGroupFlowEvents".to_string(),
            properties: FlowLogProperties { version, flows },
        }
    }

    #[test]
    fn test_traversal_order() {
        let doc = document(
            FormatVersion::V1,
            vec![
                RuleGroup {
                    rule: "rule-a".to_string(),
                    flows: vec![
                        interface("MAC1", &["1,10.0.0.1,10.0.0.9,1,1,T,I,A", "2,10.0.0.2,10.0.0.9,1,1,T,I,A"]),
                        interface("MAC2", &["3,10.0.0.3,10.0.0.9,1,1,T,I,A"]),
                    ],
                },
                RuleGroup {
                    rule: "rule-empty".to_string(),
                    flows: vec![interface("MAC3", &[])],
                },
                RuleGroup {
                    rule: "rule-b".to_string(),
                    flows: vec![interface("MAC1", &["4,10.0.0.4,10.0.0.9,1,1,U,O,D"])],
                },
            ],
        );

        let records: Vec<_> = doc.flow_records().map(|r| r.unwrap()).collect();
        let order: Vec<_> = records
            .iter()
            .map(|r| (r.tuple.start_time, r.rule, r.mac))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "rule-a", "MAC1"),
                (2, "rule-a", "MAC1"),
                (3, "rule-a", "MAC2"),
                (4, "rule-b", "MAC1"),
            ]
        );
    }

    #[test]
    fn test_records_carry_document_metadata() {
        let doc = document(
            FormatVersion::V2,
            vec![RuleGroup {
                rule: "UserRule_Allow443".to_string(),
                flows: vec![interface(
                    "000D3AF87856",
                    &["1577836800,10.0.0.4,10.0.0.5,1234,443,T,I,C,10,1000,5,500"],
                )],
            }],
        );

        let records: Vec<_> = doc.flow_records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.time, "2020-01-01T00:00:00Z");
        assert_eq!(record.category, "NetworkSecurityGroupFlowEvent");
        assert_eq!(record.operation_name, "NetworkSecurityGroupFlowEvents");
        assert_eq!(record.resource_id, "/SUBSCRIPTIONS/X/NSG");
        assert_eq!(record.rule, "UserRule_Allow443");
        assert_eq!(record.mac, "000D3AF87856");
        assert_eq!(record.tuple.version, FormatVersion::V2);
    }

    #[test]
    fn test_no_rule_groups_yields_nothing() {
        let doc = document(FormatVersion::V2, Vec::new());
        let mut records = doc.flow_records();
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_bad_tuple_yielded_in_position() {
        let doc = document(
            FormatVersion::V1,
            vec![RuleGroup {
                rule: "r".to_string(),
                flows: vec![interface(
                    "MAC",
                    &["1,10.0.0.1,10.0.0.9,1,1,T,I,A", "garbage", "3,10.0.0.3,10.0.0.9,1,1,T,I,A"],
                )],
            }],
        );

        let results: Vec<_> = doc.flow_records().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(TupleError::FieldCount { .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_record_serializes_flat() {
        let doc = document(
            FormatVersion::V1,
            vec![RuleGroup {
                rule: "r".to_string(),
                flows: vec![interface("MAC", &["1,10.0.0.1,10.0.0.9,1,1,T,I,A"])],
            }],
        );
        let record = doc.flow_records().next().unwrap().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rule"], "r");
        assert_eq!(json["source_address"], "10.0.0.1");
        assert_eq!(json["version"], 1);
    }
}
