use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, debug_span};

use tsquery_model::{QueryRequest, QueryResponseItem, SubQuery};

use crate::filter::{compile_filters, filters_from_tags, CompiledFilter};
use crate::grouping::build_groups;
use crate::pipeline::Pipeline;
use crate::provider::SeriesProvider;
use crate::response::format_group;
use crate::runtime_error::RuntimeResult;
use crate::types::normalize_timestamp;

struct QueryPlan {
    filters: Vec<CompiledFilter>,
    pipeline: Pipeline,
}

/// Executes a query request against a series provider.
///
/// Every block is validated and planned before any data access, so a bad
/// request never yields partial output. Blocks run independently: one with
/// no matching series simply contributes no groups. Result groups are
/// processed in parallel; each one owns its point slices and the stages
/// run sequentially within it.
pub fn execute_request<P: SeriesProvider + ?Sized>(
    provider: &P,
    request: &QueryRequest,
) -> RuntimeResult<Vec<QueryResponseItem>> {
    request.validate()?;

    let start = normalize_timestamp(request.start);
    let end = request
        .end
        .map(normalize_timestamp)
        .unwrap_or_else(|| Utc::now().timestamp());

    let plans = request
        .queries
        .iter()
        .map(|query| plan_query(query, start, end))
        .collect::<RuntimeResult<Vec<_>>>()?;

    let mut results = Vec::new();
    for (query, plan) in request.queries.iter().zip(plans) {
        let span = debug_span!("query", metric = %query.metric);
        let _guard = span.enter();

        let series = provider.series_for_metric(&query.metric, start, end)?;
        let groups = build_groups(&series, &plan.filters);
        debug!(series = series.len(), groups = groups.len(), "resolved");

        let items: Vec<QueryResponseItem> = groups
            .into_par_iter()
            .filter_map(|mut group| {
                group.members = plan.pipeline.execute(std::mem::take(&mut group.members));
                format_group(
                    &query.metric,
                    group,
                    request.show_tsuids,
                    request.ms_resolution,
                )
            })
            .collect();
        results.extend(items);
    }
    Ok(results)
}

fn plan_query(query: &SubQuery, start: i64, end: i64) -> RuntimeResult<QueryPlan> {
    let mut specs = filters_from_tags(&query.tags);
    specs.extend(query.filters.iter().cloned());
    Ok(QueryPlan {
        filters: compile_filters(&specs)?,
        pipeline: Pipeline::build(query, start, end)?,
    })
}
