use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::runtime_error::{RuntimeError, RuntimeResult};
use crate::types::{normalize_timestamp, DataPoint, Series};

use super::SeriesProvider;

/// In-memory implementation of [`SeriesProvider`] primarily for testing.
///
/// Carries the two collaborator contracts the engine assumes of a real
/// store: resolving a (metric, tags) pair to a stable series identifier
/// and fetching a series' points for a time range. Writers may run
/// concurrently; a query issued after the writes complete sees all of
/// them.
#[derive(Default, Debug)]
pub struct MemorySeriesProvider {
    inner: RwLock<Storage>,
}

#[derive(Default, Debug)]
struct Storage {
    series: BTreeMap<String, SeriesEntry>,
}

#[derive(Debug, Clone)]
struct SeriesEntry {
    tsuid: String,
    metric: String,
    tags: BTreeMap<String, String>,
    points: BTreeMap<i64, f32>,
}

impl MemorySeriesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one datapoint, creating the series on first sight. The
    /// timestamp may be seconds or milliseconds; a rewritten timestamp
    /// replaces the previous value so timestamps stay unique.
    pub fn put(
        &self,
        metric: &str,
        tags: &[(&str, &str)],
        timestamp: i64,
        value: f32,
    ) -> RuntimeResult<()> {
        let tags: BTreeMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut storage = self.write()?;
        let entry = storage.entry(metric, tags);
        entry.points.insert(normalize_timestamp(timestamp), value);
        Ok(())
    }

    /// Resolves (metric, tags) to the stable series identifier, creating
    /// the series when it does not exist yet.
    pub fn resolve_series_id(
        &self,
        metric: &str,
        tags: &BTreeMap<String, String>,
    ) -> RuntimeResult<String> {
        let mut storage = self.write()?;
        Ok(storage.entry(metric, tags.clone()).tsuid.clone())
    }

    /// Fetches the points of one series between start and end, inclusive.
    pub fn fetch_points(&self, tsuid: &str, start: i64, end: i64) -> RuntimeResult<Vec<DataPoint>> {
        let storage = self.read()?;
        let entry = storage
            .series
            .values()
            .find(|entry| entry.tsuid == tsuid)
            .ok_or_else(|| RuntimeError::General(format!("unknown series id {tsuid}")))?;
        Ok(entry.points_in_range(start, end))
    }

    fn read(&self) -> RuntimeResult<std::sync::RwLockReadGuard<'_, Storage>> {
        self.inner
            .read()
            .map_err(|_| RuntimeError::from("series storage lock poisoned"))
    }

    fn write(&self) -> RuntimeResult<std::sync::RwLockWriteGuard<'_, Storage>> {
        self.inner
            .write()
            .map_err(|_| RuntimeError::from("series storage lock poisoned"))
    }
}

impl SeriesProvider for MemorySeriesProvider {
    fn series_for_metric(&self, metric: &str, start: i64, end: i64) -> RuntimeResult<Vec<Series>> {
        let storage = self.read()?;
        let mut result = Vec::new();
        for entry in storage.series.values() {
            if entry.metric != metric {
                continue;
            }
            let points = entry.points_in_range(start, end);
            if points.is_empty() {
                continue;
            }
            result.push(Series::new(
                entry.tsuid.clone(),
                entry.metric.clone(),
                entry.tags.clone(),
                points,
            ));
        }
        Ok(result)
    }
}

impl Storage {
    fn entry(&mut self, metric: &str, tags: BTreeMap<String, String>) -> &mut SeriesEntry {
        let key = canonical_key(metric, &tags);
        let next_id = self.series.len() + 1;
        self.series.entry(key).or_insert_with(|| SeriesEntry {
            tsuid: format!("{next_id:06X}"),
            metric: metric.to_string(),
            tags,
            points: BTreeMap::new(),
        })
    }
}

impl SeriesEntry {
    fn points_in_range(&self, start: i64, end: i64) -> Vec<DataPoint> {
        if start > end {
            return vec![];
        }
        self.points
            .range(start..=end)
            .map(|(&timestamp, &value)| DataPoint::new(timestamp, value))
            .collect()
    }
}

fn canonical_key(metric: &str, tags: &BTreeMap<String, String>) -> String {
    let mut key = String::from(metric);
    key.push('{');
    for (i, (tagk, tagv)) in tags.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        key.push_str(tagk);
        key.push('=');
        key.push_str(tagv);
    }
    key.push('}');
    key
}
