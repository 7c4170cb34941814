//! Query execution engine for a time-series database.
//!
//! Turns a validated [`tsquery_model::QueryRequest`] into per-group
//! datapoint series: tag filters select the candidate series, group-by
//! keys partition them, and each group's points are threaded through the
//! configured pipeline stages (value filter, cross-series merge,
//! downsample, rate) in the default or user-supplied order. Storage is
//! behind the [`SeriesProvider`] trait; an in-memory implementation ships
//! for tests.

mod aggregators;
mod exec;
mod filter;
mod grouping;
pub mod pipeline;
pub mod provider;
mod response;
mod runtime_error;
mod types;

pub use aggregators::{aggr_func, AggrFunc};
pub use exec::execute_request;
pub use filter::{
    compile_filter, compile_filters, filters_from_tags, series_matches, CompiledFilter, TagMatcher,
};
pub use grouping::build_groups;
pub use pipeline::{resolve_order, ConfiguredStages, Pipeline, StageKind, DEFAULT_ORDER};
pub use provider::{MemorySeriesProvider, NullSeriesProvider, SeriesProvider};
pub use response::format_group;
pub use runtime_error::{RuntimeError, RuntimeResult};
pub use types::{normalize_timestamp, DataPoint, MemberSeries, PointValue, ResultGroup, Series};
