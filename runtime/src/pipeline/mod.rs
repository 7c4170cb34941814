mod downsample;
mod merge;
mod order;
mod rate;
mod value_filter;

pub use order::{resolve_order, ConfiguredStages, StageKind, DEFAULT_ORDER};

use tsquery_model::SubQuery;

use crate::runtime_error::RuntimeResult;
use crate::types::MemberSeries;

use downsample::DownsampleStage;
use merge::MergeStage;
use rate::RateStage;
use value_filter::ValueFilterStage;

/// One pipeline stage, instantiated from validated query configuration.
/// Every stage maps a group's member sequences to member sequences; merge
/// is the only one that changes their count.
enum Stage {
    ValueFilter(ValueFilterStage),
    Merge(MergeStage),
    Downsample(DownsampleStage),
    Rate(RateStage),
}

impl Stage {
    fn apply(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        match self {
            Stage::ValueFilter(stage) => stage.apply(members),
            Stage::Merge(stage) => stage.apply(members),
            Stage::Downsample(stage) => stage.apply(members),
            Stage::Rate(stage) => stage.apply(members),
        }
    }
}

/// The ordered stage list for one query block, built once per query after
/// order validation and applied to every result group.
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn build(query: &SubQuery, start: i64, end: i64) -> RuntimeResult<Pipeline> {
        let downsample = query.downsample_spec()?;
        let value_filter = query.value_filter()?;
        if let Some(options) = &query.rate_options {
            options.validate()?;
        }

        let order = resolve_order(query.order.as_deref(), ConfiguredStages::from_query(query))?;

        let mut stages = Vec::with_capacity(order.len());
        for kind in order {
            match kind {
                StageKind::Aggregation => {
                    stages.push(Stage::Merge(MergeStage::new(query.aggregator)));
                }
                StageKind::FilterValue => {
                    if let Some(filter) = value_filter {
                        stages.push(Stage::ValueFilter(ValueFilterStage::new(filter)));
                    }
                }
                StageKind::Downsample => {
                    if let Some(spec) = downsample {
                        stages.push(Stage::Downsample(DownsampleStage::new(spec, start, end)));
                    }
                }
                StageKind::Rate => {
                    if query.rate {
                        stages.push(Stage::Rate(RateStage::new(
                            query.rate_options.unwrap_or_default(),
                        )));
                    }
                }
            }
        }

        Ok(Pipeline { stages })
    }

    /// Threads a group's member sequences through the stages in order.
    pub fn execute(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        self.stages
            .iter()
            .fold(members, |members, stage| stage.apply(members))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use tsquery_model::{Aggregator, SubQuery};

    use crate::types::DataPoint;

    use super::*;

    fn base_query() -> SubQuery {
        SubQuery {
            metric: "m".to_string(),
            aggregator: Aggregator::Sum,
            ..Default::default()
        }
    }

    fn member(tsuid: &str, raw: &[(i64, f32)]) -> MemberSeries {
        MemberSeries::new(
            tsuid,
            raw.iter().map(|&(t, v)| DataPoint::new(t, v)).collect(),
        )
    }

    #[test]
    fn default_pipeline_merges_then_downsamples() {
        let mut query = base_query();
        query.aggregator = Aggregator::Count;
        query.downsample = Some("2m-sum".to_string());
        let pipeline = Pipeline::build(&query, 0, 240).unwrap();
        let out = pipeline.execute(vec![
            member("a", &[(0, 1.0), (60, 2.0)]),
            member("b", &[(0, 3.0), (60, 4.0)]),
        ]);
        assert_eq!(out.len(), 1);
        // Count per timestamp (2 and 2), then the bucket sums the counts.
        assert_eq!(out[0].points, vec![DataPoint::new(0, 4.0)]);
    }

    #[test]
    fn custom_order_downsamples_each_series_before_merging() {
        let mut query = base_query();
        query.aggregator = Aggregator::Count;
        query.downsample = Some("2m-sum".to_string());
        query.order = Some(
            ["downsample", "aggregation"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let pipeline = Pipeline::build(&query, 0, 240).unwrap();
        let out = pipeline.execute(vec![
            member("a", &[(0, 1.0), (60, 2.0)]),
            member("b", &[(0, 3.0), (60, 4.0)]),
        ]);
        // Per-series bucket sums first, then count sees two series.
        assert_eq!(out[0].points, vec![DataPoint::new(0, 2.0)]);
    }

    #[test]
    fn invalid_order_fails_before_execution() {
        let mut query = base_query();
        query.order = Some(vec!["aggregation".to_string(), "bogus".to_string()]);
        assert!(Pipeline::build(&query, 0, 240).is_err());
    }
}
