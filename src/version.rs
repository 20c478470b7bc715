//! Flow-log format version.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric schema version of a flow-log document.
///
/// Version 1 tuples carry the 5-tuple, direction and decision only. Version 2
/// adds the flow state and the per-direction packet and byte counters.
/// Anything at or above 2 is read with the version 2 layout.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FormatVersion(f64);

impl FormatVersion {
    /// Version 1: no flow state, no counters.
    pub const V1: FormatVersion = FormatVersion(1.0);
    /// Version 2: flow state and counters.
    pub const V2: FormatVersion = FormatVersion(2.0);

    pub fn new(version: f64) -> Self {
        Self(version)
    }

    /// Whether tuples of this version carry flow state and counters.
    ///
    /// NaN compares false and is treated like version 1.
    pub fn has_flow_state(self) -> bool {
        self.0 >= Self::V2.0
    }

    fn as_whole_number(self) -> Option<i64> {
        // 2^53: beyond this an f64 no longer holds every integer exactly
        const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
        if self.0.fract() == 0.0 && self.0.abs() < EXACT_LIMIT {
            Some(self.0 as i64)
        } else {
            None
        }
    }
}

impl From<f64> for FormatVersion {
    fn from(version: f64) -> Self {
        Self(version)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole_number() {
            Some(whole) => write!(f, "{}", whole),
            None => write!(f, "{}", self.0),
        }
    }
}

// Source documents write `"Version": 2`; keep whole numbers as integers when
// the record is re-serialized so the relayed message matches its input.
impl Serialize for FormatVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_whole_number() {
            Some(whole) => serializer.serialize_i64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for FormatVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(FormatVersion)
    }
}
