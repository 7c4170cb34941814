use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ParseError, ParseResult};
use crate::request::Aggregator;

/// Time units accepted in a downsample specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    #[strum(serialize = "s")]
    Seconds,
    #[serde(rename = "m")]
    #[strum(serialize = "m")]
    Minutes,
    #[serde(rename = "h")]
    #[strum(serialize = "h")]
    Hours,
    #[serde(rename = "d")]
    #[strum(serialize = "d")]
    Days,
    #[serde(rename = "w")]
    #[strum(serialize = "w")]
    Weeks,
    #[serde(rename = "n")]
    #[strum(serialize = "n")]
    Months,
    #[serde(rename = "y")]
    #[strum(serialize = "y")]
    Years,
}

impl TimeUnit {
    /// Bucket width in seconds for units with a fixed length. Months and
    /// years vary and are resolved against the calendar instead.
    pub fn fixed_seconds(&self) -> Option<i64> {
        match self {
            TimeUnit::Seconds => Some(1),
            TimeUnit::Minutes => Some(60),
            TimeUnit::Hours => Some(3_600),
            TimeUnit::Days => Some(86_400),
            TimeUnit::Weeks => Some(7 * 86_400),
            TimeUnit::Months | TimeUnit::Years => None,
        }
    }
}

/// How an empty downsample bucket shows up in the output.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FillPolicy {
    /// The bucket is omitted from the output entirely.
    #[default]
    None,
    /// The bucket is emitted with an explicit missing-value marker.
    Null,
    /// The bucket is emitted as the literal string "NaN".
    Nan,
    /// The bucket is emitted as numeric zero.
    Zero,
}

/// A parsed `<bucket><unit>-<aggregator>[-<fill>]` downsample specifier,
/// e.g. `5m-avg` or `1h-sum-null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownsampleSpec {
    pub bucket_size: i64,
    pub unit: TimeUnit,
    pub aggregator: Aggregator,
    pub fill_policy: FillPolicy,
}

impl FromStr for DownsampleSpec {
    type Err = ParseError;

    fn from_str(spec: &str) -> ParseResult<Self> {
        let invalid = || ParseError::InvalidDownsample(spec.to_string());

        let mut parts = spec.splitn(3, '-');
        let interval = parts.next().unwrap_or_default();
        let aggregator = parts.next().ok_or_else(invalid)?;
        let fill = parts.next();

        let unit_at = interval
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        if unit_at == 0 {
            return Err(invalid());
        }
        let bucket_size: i64 = interval[..unit_at].parse().map_err(|_| invalid())?;
        if bucket_size == 0 {
            return Err(invalid());
        }
        let unit = TimeUnit::from_str(&interval[unit_at..]).map_err(|_| invalid())?;
        let aggregator = Aggregator::from_str(aggregator)
            .map_err(|_| ParseError::UnknownAggregator(aggregator.to_string()))?;
        let fill_policy = match fill {
            Some(fill) => FillPolicy::from_str(fill).map_err(|_| invalid())?,
            None => FillPolicy::None,
        };

        Ok(DownsampleSpec {
            bucket_size,
            unit,
            aggregator,
            fill_policy,
        })
    }
}
