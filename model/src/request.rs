use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::downsample::DownsampleSpec;
use crate::error::{ParseError, ParseResult};
use crate::value_filter::ValueFilter;

/// Top-level query request as posted to the query endpoint.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(rename = "showTSUIDs", default)]
    pub show_tsuids: bool,
    #[serde(rename = "msResolution", default)]
    pub ms_resolution: bool,
    pub queries: Vec<SubQuery>,
}

impl QueryRequest {
    /// Validates every query block. Either the whole request is executable
    /// or nothing runs.
    pub fn validate(&self) -> ParseResult<()> {
        for query in &self.queries {
            query.validate()?;
        }
        Ok(())
    }
}

/// A single query block: one metric, one selector, one pipeline
/// configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuery {
    pub metric: String,
    pub aggregator: Aggregator,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downsample: Option<String>,
    #[serde(default)]
    pub rate: bool,
    #[serde(rename = "rateOptions", default, skip_serializing_if = "Option::is_none")]
    pub rate_options: Option<RateOptions>,
    #[serde(rename = "filterValue", default, skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
}

impl SubQuery {
    pub fn validate(&self) -> ParseResult<()> {
        if self.metric.trim().is_empty() {
            return Err(ParseError::EmptyMetric);
        }
        for (key, value) in &self.tags {
            if key.is_empty() {
                return Err(ParseError::EmptyTagKey);
            }
            if value.is_empty() {
                return Err(ParseError::EmptyTagValue(key.clone()));
            }
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        if let Some(opts) = &self.rate_options {
            opts.validate()?;
        }
        // Parse failures in the stage specs abort the query up front.
        self.downsample_spec()?;
        self.value_filter()?;
        Ok(())
    }

    /// The parsed downsample specification, if one is configured.
    pub fn downsample_spec(&self) -> ParseResult<Option<DownsampleSpec>> {
        match &self.downsample {
            Some(spec) => Ok(Some(spec.parse()?)),
            None => Ok(None),
        }
    }

    /// The parsed value-filter expression, if one is configured.
    pub fn value_filter(&self) -> ParseResult<Option<ValueFilter>> {
        match &self.filter_value {
            Some(expr) => Ok(Some(expr.parse()?)),
            None => Ok(None),
        }
    }
}

/// Cross-series aggregation functions.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Aggregator {
    #[default]
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

/// Per-tag filter predicate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum FilterType {
    #[serde(rename = "regexp")]
    #[strum(serialize = "regexp")]
    Regexp,
    #[serde(rename = "wildcard")]
    #[strum(serialize = "wildcard")]
    Wildcard,
    #[serde(rename = "literal_or")]
    #[strum(serialize = "literal_or")]
    LiteralOr,
    #[serde(rename = "not_literal_or")]
    #[strum(serialize = "not_literal_or")]
    NotLiteralOr,
    #[serde(rename = "iliteral_or")]
    #[strum(serialize = "iliteral_or")]
    ILiteralOr,
}

impl FilterType {
    /// Characters reserved for `regexp` patterns. The other filter kinds
    /// reject them instead of guessing at intent.
    fn reserved_characters(&self) -> &'static [char] {
        match self {
            FilterType::Regexp => &[],
            FilterType::Wildcard => &['|'],
            FilterType::LiteralOr | FilterType::NotLiteralOr | FilterType::ILiteralOr => &['*'],
        }
    }
}

/// One per-tag filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "type")]
    pub kind: FilterType,
    pub tagk: String,
    pub filter: String,
    #[serde(rename = "groupBy", default)]
    pub group_by: bool,
}

impl FilterSpec {
    pub fn new(kind: FilterType, tagk: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            kind,
            tagk: tagk.into(),
            filter: filter.into(),
            group_by: false,
        }
    }

    pub fn group_by(mut self, group_by: bool) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn validate(&self) -> ParseResult<()> {
        if self.tagk.is_empty() {
            return Err(ParseError::EmptyFilterTagKey);
        }
        let reserved = self.kind.reserved_characters();
        if self.filter.chars().any(|c| reserved.contains(&c)) {
            return Err(ParseError::InvalidFilterCharacters(self.filter.clone()));
        }
        Ok(())
    }
}

/// Counter semantics for the rate stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateOptions {
    #[serde(default)]
    pub counter: bool,
    #[serde(rename = "counterMax", default, skip_serializing_if = "Option::is_none")]
    pub counter_max: Option<i64>,
    #[serde(rename = "resetValue", default, skip_serializing_if = "Option::is_none")]
    pub reset_value: Option<i64>,
}

impl RateOptions {
    pub fn validate(&self) -> ParseResult<()> {
        if matches!(self.counter_max, Some(max) if max < 0) {
            return Err(ParseError::InvalidCounterMax);
        }
        Ok(())
    }
}
