use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while decoding or validating a query request, before any
/// data access happens.
#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("missing or empty metric name")]
    EmptyMetric,
    #[error("empty tag key in query")]
    EmptyTagKey,
    #[error("empty value for tag {0}")]
    EmptyTagValue(String),
    #[error("missing tag key in filter")]
    EmptyFilterTagKey,
    #[error("Invalid characters in field filter: {0}")]
    InvalidFilterCharacters(String),
    #[error("counter max needs to be a positive integer")]
    InvalidCounterMax,
    #[error("invalid downsample specifier: {0}")]
    InvalidDownsample(String),
    #[error("unknown aggregator: {0}")]
    UnknownAggregator(String),
    #[error("invalid value filter expression: {0}")]
    InvalidValueFilter(String),
}
