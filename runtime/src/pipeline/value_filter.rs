use tsquery_model::ValueFilter;

use crate::types::MemberSeries;

/// Drops points whose value fails the comparison. A member whose points
/// are all dropped leaves the group entirely, identifiers included.
pub(crate) struct ValueFilterStage {
    filter: ValueFilter,
}

impl ValueFilterStage {
    pub fn new(filter: ValueFilter) -> Self {
        ValueFilterStage { filter }
    }

    pub fn apply(&self, members: Vec<MemberSeries>) -> Vec<MemberSeries> {
        members
            .into_iter()
            .filter_map(|mut member| {
                member.points.retain(|point| {
                    point
                        .value
                        .as_f32()
                        .map(|v| self.filter.matches(v))
                        .unwrap_or(false)
                });
                if member.points.is_empty() {
                    None
                } else {
                    Some(member)
                }
            })
            .collect()
    }
}
