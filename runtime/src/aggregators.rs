use tsquery_model::Aggregator;

/// An aggregation function over the values present at one merge timestamp
/// or inside one downsample bucket. Callers never pass an empty slice.
pub type AggrFunc = fn(&[f32]) -> f32;

pub fn aggr_func(aggregator: Aggregator) -> AggrFunc {
    match aggregator {
        Aggregator::Sum => aggr_sum,
        Aggregator::Avg => aggr_avg,
        Aggregator::Min => aggr_min,
        Aggregator::Max => aggr_max,
        Aggregator::Count => aggr_count,
    }
}

fn aggr_sum(values: &[f32]) -> f32 {
    values.iter().sum()
}

fn aggr_avg(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn aggr_min(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}

fn aggr_max(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn aggr_count(values: &[f32]) -> f32 {
    values.len() as f32
}
