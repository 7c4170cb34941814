mod memory_provider;

pub use memory_provider::MemorySeriesProvider;

use crate::runtime_error::RuntimeResult;
use crate::types::Series;

/// External series source. The query pipeline receives already-resolved
/// series: identifier, metric, full tag map, and the points within the
/// requested range (inclusive), timestamp-ascending.
pub trait SeriesProvider: Sync + Send {
    fn series_for_metric(&self, metric: &str, start: i64, end: i64) -> RuntimeResult<Vec<Series>>;
}

pub struct NullSeriesProvider {}

impl SeriesProvider for NullSeriesProvider {
    fn series_for_metric(&self, _metric: &str, _start: i64, _end: i64) -> RuntimeResult<Vec<Series>> {
        Ok(vec![])
    }
}
