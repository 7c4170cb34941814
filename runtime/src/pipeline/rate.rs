use tsquery_model::RateOptions;

use crate::types::{DataPoint, MemberSeries, PointValue};

/// Rate-of-change over consecutive points. Each output point sits at the
/// later timestamp of its source pair, so an N-point input yields N-1
/// points. With `counter` set a decrease is a counter reset: the delta
/// wraps through `counterMax` when one is given, and a computed rate above
/// `resetValue` collapses to zero.
pub(crate) struct RateStage {
    options: RateOptions,
}

impl RateStage {
    pub fn new(options: RateOptions) -> Self {
        RateStage { options }
    }

    pub fn apply(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        members
            .into_iter()
            .map(|mut member| {
                member.points = self.rate(&member.points);
                member
            })
            .collect()
    }

    fn rate(&self, points: &[DataPoint]) -> Vec<DataPoint> {
        points
            .windows(2)
            .map(|pair| {
                let (prev, next) = (pair[0], pair[1]);
                let value = match (prev.value, next.value) {
                    (PointValue::Present(v1), PointValue::Present(v2)) => PointValue::Present(
                        self.rate_between(prev.timestamp, v1, next.timestamp, v2),
                    ),
                    // No arithmetic against a fill marker; the interval
                    // keeps the marker itself.
                    (_, marker) if !marker.is_present() => marker,
                    (marker, _) => marker,
                };
                DataPoint {
                    timestamp: next.timestamp,
                    value,
                }
            })
            .collect()
    }

    fn rate_between(&self, t1: i64, v1: f32, t2: i64, v2: f32) -> f32 {
        let mut delta = v2 - v1;
        if self.options.counter && delta < 0.0 {
            if let Some(max) = self.options.counter_max {
                delta = max as f32 - v1 + v2;
            }
        }
        let rate = delta / (t2 - t1) as f32;
        if self.options.counter {
            if let Some(reset) = self.options.reset_value {
                if rate > reset as f32 {
                    return 0.0;
                }
            }
        }
        rate
    }
}
