use std::collections::BTreeMap;

use tsquery_model::Aggregator;

use crate::aggregators::{aggr_func, AggrFunc};
use crate::types::{DataPoint, MemberSeries, PointValue};

/// Cross-series aggregation. Values are combined at each timestamp present
/// in any member; series are never interpolated or shifted onto a common
/// grid, so a one-second offset between members yields distinct output
/// points. A timestamp covered by only a subset of members aggregates over
/// that subset.
pub(crate) struct MergeStage {
    func: AggrFunc,
}

impl MergeStage {
    pub fn new(aggregator: Aggregator) -> Self {
        MergeStage {
            func: aggr_func(aggregator),
        }
    }

    pub fn apply(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        if members.is_empty() {
            return members;
        }

        let mut columns: BTreeMap<i64, Vec<PointValue>> = BTreeMap::new();
        let mut tsuids = Vec::new();
        for member in members {
            tsuids.extend(member.tsuids);
            for point in member.points {
                columns.entry(point.timestamp).or_default().push(point.value);
            }
        }

        let points = columns
            .into_iter()
            .map(|(timestamp, values)| {
                let present: Vec<f32> = values.iter().filter_map(PointValue::as_f32).collect();
                if present.is_empty() {
                    // Only markers at this instant; pass the marker through.
                    DataPoint::marker(timestamp, values[0])
                } else {
                    DataPoint::new(timestamp, (self.func)(&present))
                }
            })
            .collect();

        vec![MemberSeries { tsuids, points }]
    }
}
