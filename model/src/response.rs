use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A datapoint value as it appears on the wire: a number, the literal
/// string "NaN", or JSON null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireValue {
    Number(f32),
    NotANumber,
    Null,
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WireValue::Number(v) => serializer.serialize_f32(*v),
            WireValue::NotANumber => serializer.serialize_str("NaN"),
            WireValue::Null => serializer.serialize_unit(),
        }
    }
}

/// The `dps` object of a result group: timestamp keys rendered as decimal
/// strings, in ascending timestamp order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dps(Vec<(i64, WireValue)>);

impl Dps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: i64, value: WireValue) {
        self.0.push((timestamp, value));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(i64, WireValue)> {
        self.0.iter()
    }
}

impl FromIterator<(i64, WireValue)> for Dps {
    fn from_iter<I: IntoIterator<Item = (i64, WireValue)>>(iter: I) -> Self {
        Dps(iter.into_iter().collect())
    }
}

impl Serialize for Dps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (timestamp, value) in &self.0 {
            map.serialize_entry(&timestamp.to_string(), value)?;
        }
        map.end()
    }
}

/// One result group of a query response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponseItem {
    pub metric: String,
    pub tags: BTreeMap<String, String>,
    #[serde(rename = "aggregateTags")]
    pub aggregate_tags: Vec<String>,
    pub tsuids: Vec<String>,
    pub dps: Dps,
}
