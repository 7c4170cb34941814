use std::collections::BTreeMap;

use super::DataPoint;

/// A resolved series: identifier, metric, full tag map, and the points
/// fetched for the query's time range, timestamp-ascending with unique
/// timestamps.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    pub tsuid: String,
    pub metric: String,
    pub tags: BTreeMap<String, String>,
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn new(
        tsuid: impl Into<String>,
        metric: impl Into<String>,
        tags: BTreeMap<String, String>,
        points: Vec<DataPoint>,
    ) -> Self {
        Series {
            tsuid: tsuid.into(),
            metric: metric.into(),
            tags,
            points,
        }
    }

    pub fn tag_value(&self, tagk: &str) -> Option<&str> {
        self.tags.get(tagk).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
