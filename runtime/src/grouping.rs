use std::collections::BTreeMap;

use ahash::AHashSet;
use itertools::Itertools;

use crate::filter::{series_matches, CompiledFilter};
use crate::types::{MemberSeries, ResultGroup, Series};

/// Partitions the matched series into result groups.
///
/// Every tag key referenced by a group-by filter splits the result by its
/// distinct values among the matched series; the cross product of those
/// value sets defines the groups. With no group-by key all matched series
/// fall into a single group. Groups are emitted in sorted key/value order,
/// and a cross-product combination with no member series is skipped.
pub fn build_groups(series: &[Series], filters: &[CompiledFilter]) -> Vec<ResultGroup> {
    let matched: Vec<&Series> = series
        .iter()
        .filter(|s| series_matches(&s.tags, filters))
        .collect();
    if matched.is_empty() {
        return vec![];
    }

    let group_keys: Vec<&str> = filters
        .iter()
        .filter(|f| f.group_by)
        .map(|f| f.tagk.as_str())
        .unique()
        .sorted()
        .collect();
    if group_keys.is_empty() {
        return vec![make_group(matched)];
    }

    let value_sets: Vec<Vec<&str>> = group_keys
        .iter()
        .map(|key| {
            matched
                .iter()
                .filter_map(|s| s.tag_value(key))
                .unique()
                .sorted()
                .collect()
        })
        .collect();

    value_sets
        .into_iter()
        .multi_cartesian_product()
        .filter_map(|combo| {
            let members: Vec<&Series> = matched
                .iter()
                .filter(|s| {
                    group_keys
                        .iter()
                        .zip(&combo)
                        .all(|(key, value)| s.tag_value(key) == Some(*value))
                })
                .copied()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(make_group(members))
            }
        })
        .collect()
}

/// Classifies every tag key seen across the member series: identical in
/// all members means an invariant `tags` entry, anything else lands in
/// `agg_tags`. Keys narrowed to one value by intersecting filters come out
/// invariant here no matter which filter carried the group-by flag.
fn make_group(members: Vec<&Series>) -> ResultGroup {
    let mut keys: AHashSet<&str> = AHashSet::new();
    for series in &members {
        keys.extend(series.tags.keys().map(String::as_str));
    }

    let mut tags = BTreeMap::new();
    let mut agg_tags = Vec::new();
    for key in keys {
        let invariant = members[0]
            .tag_value(key)
            .filter(|&value| members.iter().all(|s| s.tag_value(key) == Some(value)));
        match invariant {
            Some(value) => {
                tags.insert(key.to_string(), value.to_string());
            }
            None => agg_tags.push(key.to_string()),
        }
    }
    agg_tags.sort();

    let members = members
        .into_iter()
        .map(|s| MemberSeries::new(s.tsuid.clone(), s.points.clone()))
        .collect();

    ResultGroup {
        tags,
        agg_tags,
        members,
    }
}
