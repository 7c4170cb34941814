use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use tsquery_model::{DownsampleSpec, FillPolicy, TimeUnit};

use crate::aggregators::{aggr_func, AggrFunc};
use crate::types::{DataPoint, MemberSeries, PointValue};

/// Seconds from the epoch to the first Sunday after it (1970-01-04).
/// Week buckets are anchored there so weeks begin on Sunday UTC.
const WEEK_ANCHOR: i64 = 3 * 86_400;

/// Re-buckets a point sequence into fixed, boundary-aligned windows.
/// Sub-day units align to multiples of the bucket width from the epoch;
/// day, week, month and year buckets align to UTC calendar boundaries.
pub(crate) struct DownsampleStage {
    spec: DownsampleSpec,
    func: AggrFunc,
    start: i64,
    end: i64,
}

impl DownsampleStage {
    pub fn new(spec: DownsampleSpec, start: i64, end: i64) -> Self {
        DownsampleStage {
            spec,
            func: aggr_func(spec.aggregator),
            start,
            end,
        }
    }

    pub fn apply(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        members
            .into_iter()
            .map(|mut member| {
                member.points = self.downsample(&member.points);
                member
            })
            .collect()
    }

    fn downsample(&self, points: &[DataPoint]) -> Vec<DataPoint> {
        if points.is_empty() {
            return vec![];
        }

        let mut buckets: BTreeMap<i64, Vec<f32>> = BTreeMap::new();
        for point in points {
            if let Some(value) = point.value.as_f32() {
                buckets
                    .entry(self.bucket_start(point.timestamp))
                    .or_default()
                    .push(value);
            }
        }

        let Some(marker) = fill_marker(self.spec.fill_policy) else {
            // No fill: empty buckets are omitted from the output.
            return buckets
                .into_iter()
                .map(|(timestamp, values)| DataPoint::new(timestamp, (self.func)(&values)))
                .collect();
        };

        let last = self.bucket_start(self.end);
        let mut bucket = self.bucket_start(self.start);
        let mut out = Vec::new();
        while bucket <= last {
            match buckets.get(&bucket) {
                Some(values) => out.push(DataPoint::new(bucket, (self.func)(values))),
                None => {
                    // A bucket starting exactly on the end boundary shows up
                    // only when it holds an in-range point.
                    if bucket == self.end {
                        break;
                    }
                    out.push(DataPoint::marker(bucket, marker));
                }
            }
            bucket = self.next_bucket(bucket);
        }
        out
    }

    fn bucket_start(&self, timestamp: i64) -> i64 {
        let size = self.spec.bucket_size;
        if let Some(step) = self.spec.unit.fixed_seconds() {
            let width = step * size;
            let anchor = if self.spec.unit == TimeUnit::Weeks {
                WEEK_ANCHOR
            } else {
                0
            };
            return anchor + (timestamp - anchor).div_euclid(width) * width;
        }
        if self.spec.unit == TimeUnit::Months {
            let index = month_index(timestamp);
            month_start(index - index.rem_euclid(size))
        } else {
            let index = year_index(timestamp);
            year_start(index - index.rem_euclid(size))
        }
    }

    fn next_bucket(&self, bucket: i64) -> i64 {
        let size = self.spec.bucket_size;
        if let Some(step) = self.spec.unit.fixed_seconds() {
            return bucket + step * size;
        }
        if self.spec.unit == TimeUnit::Months {
            month_start(month_index(bucket) + size)
        } else {
            year_start(year_index(bucket) + size)
        }
    }
}

fn fill_marker(policy: FillPolicy) -> Option<PointValue> {
    match policy {
        FillPolicy::None => None,
        FillPolicy::Null => Some(PointValue::Missing),
        FillPolicy::Nan => Some(PointValue::NotANumber),
        FillPolicy::Zero => Some(PointValue::Present(0.0)),
    }
}

fn utc(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).expect("BUG: timestamp out of range")
}

fn month_index(timestamp: i64) -> i64 {
    let dt = utc(timestamp);
    (dt.year() as i64 - 1970) * 12 + dt.month0() as i64
}

fn month_start(index: i64) -> i64 {
    let year = 1970 + index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    Utc.with_ymd_and_hms(year as i32, month, 1, 0, 0, 0)
        .single()
        .expect("BUG: invalid calendar month")
        .timestamp()
}

fn year_index(timestamp: i64) -> i64 {
    utc(timestamp).year() as i64 - 1970
}

fn year_start(index: i64) -> i64 {
    Utc.with_ymd_and_hms((1970 + index) as i32, 1, 1, 0, 0, 0)
        .single()
        .expect("BUG: invalid calendar year")
        .timestamp()
}
