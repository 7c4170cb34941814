/// Timestamps above this are taken to be milliseconds since the epoch.
const MS_TIMESTAMP_THRESHOLD: i64 = 9_999_999_999;

/// A datapoint value. Fill policies introduce the two marker states; they
/// are kept out of the numeric domain so no float sentinel can collide
/// with real data. The wire rendering (absent key, `null`, `"NaN"`) is
/// applied only by the response formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Present(f32),
    Missing,
    NotANumber,
}

impl PointValue {
    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PointValue::Present(v) => Some(*v),
            PointValue::Missing | PointValue::NotANumber => None,
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, PointValue::Present(_))
    }
}

/// A single timestamped value. Timestamps are seconds, already normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub timestamp: i64,
    pub value: PointValue,
}

impl DataPoint {
    pub fn new(timestamp: i64, value: f32) -> Self {
        DataPoint {
            timestamp,
            value: PointValue::Present(value),
        }
    }

    pub fn marker(timestamp: i64, value: PointValue) -> Self {
        DataPoint { timestamp, value }
    }
}

/// Normalizes a second- or millisecond-resolution Unix timestamp to
/// seconds.
#[inline]
pub fn normalize_timestamp(timestamp: i64) -> i64 {
    if timestamp > MS_TIMESTAMP_THRESHOLD {
        timestamp / 1000
    } else {
        timestamp
    }
}
