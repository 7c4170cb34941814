use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{ParseError, ParseResult};

/// Comparison operators accepted in a `filterValue` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CompareOp {
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = "==")]
    Eq,
}

/// A parsed `<op><number>` value-filter expression, e.g. `>= 42` or `<0.5`.
///
/// Whitespace anywhere in the expression is tolerated, including between
/// the characters of a two-character operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueFilter {
    pub op: CompareOp,
    pub threshold: f32,
}

impl ValueFilter {
    pub fn matches(&self, value: f32) -> bool {
        match self.op {
            CompareOp::Gt => value > self.threshold,
            CompareOp::Ge => value >= self.threshold,
            CompareOp::Lt => value < self.threshold,
            CompareOp::Le => value <= self.threshold,
            CompareOp::Eq => value == self.threshold,
        }
    }
}

impl FromStr for ValueFilter {
    type Err = ParseError;

    fn from_str(expr: &str) -> ParseResult<Self> {
        let invalid = || ParseError::InvalidValueFilter(expr.to_string());

        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        // Two-character operators first so ">=" is not read as ">" "=".
        let (op, number) = if let Some(rest) = compact.strip_prefix(">=") {
            (CompareOp::Ge, rest)
        } else if let Some(rest) = compact.strip_prefix("<=") {
            (CompareOp::Le, rest)
        } else if let Some(rest) = compact.strip_prefix("==") {
            (CompareOp::Eq, rest)
        } else if let Some(rest) = compact.strip_prefix('>') {
            (CompareOp::Gt, rest)
        } else if let Some(rest) = compact.strip_prefix('<') {
            (CompareOp::Lt, rest)
        } else {
            return Err(invalid());
        };
        let threshold: f32 = number.parse().map_err(|_| invalid())?;

        Ok(ValueFilter { op, threshold })
    }
}
