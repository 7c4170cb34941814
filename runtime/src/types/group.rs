use std::collections::BTreeMap;

use super::DataPoint;

/// One member point sequence inside a result group. Before the merge stage
/// a member corresponds to a single series; merge collapses all members
/// into one carrying the union of their identifiers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemberSeries {
    pub tsuids: Vec<String>,
    pub points: Vec<DataPoint>,
}

impl MemberSeries {
    pub fn new(tsuid: impl Into<String>, points: Vec<DataPoint>) -> Self {
        MemberSeries {
            tsuids: vec![tsuid.into()],
            points,
        }
    }
}

/// A result group produced by the grouping engine and threaded through the
/// pipeline stages. `tags` holds the keys invariant across every member,
/// `agg_tags` the keys that vary.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultGroup {
    pub tags: BTreeMap<String, String>,
    pub agg_tags: Vec<String>,
    pub members: Vec<MemberSeries>,
}
