use tsquery_model::{Dps, QueryResponseItem, WireValue};

use crate::types::{PointValue, ResultGroup};

/// Renders one executed result group into its wire shape.
///
/// Returns `None` for a group whose members were all filtered away. The
/// merge stage always runs, so a surviving group holds exactly one member
/// sequence; its identifiers become `tsuids`, sorted only when the caller
/// asked for them.
pub fn format_group(
    metric: &str,
    group: ResultGroup,
    show_tsuids: bool,
    ms_resolution: bool,
) -> Option<QueryResponseItem> {
    let member = group.members.into_iter().next()?;

    let mut tsuids = member.tsuids;
    if show_tsuids {
        tsuids.sort();
    }

    let scale = if ms_resolution { 1000 } else { 1 };
    let dps = member
        .points
        .iter()
        .map(|point| (point.timestamp * scale, wire_value(point.value)))
        .collect();

    Some(QueryResponseItem {
        metric: metric.to_string(),
        tags: group.tags,
        aggregate_tags: group.agg_tags,
        tsuids,
        dps,
    })
}

fn wire_value(value: PointValue) -> WireValue {
    match value {
        PointValue::Present(v) => WireValue::Number(v),
        PointValue::Missing => WireValue::Null,
        PointValue::NotANumber => WireValue::NotANumber,
    }
}
