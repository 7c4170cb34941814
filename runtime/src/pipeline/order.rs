use phf::phf_map;
use strum::Display;

use tsquery_model::SubQuery;

use crate::runtime_error::{RuntimeError, RuntimeResult};

/// The named pipeline stages a custom `order` array can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StageKind {
    #[strum(serialize = "filterValue")]
    FilterValue,
    #[strum(serialize = "aggregation")]
    Aggregation,
    #[strum(serialize = "downsample")]
    Downsample,
    #[strum(serialize = "rate")]
    Rate,
}

static STAGE_TOKENS: phf::Map<&'static str, StageKind> = phf_map! {
    "filterValue" => StageKind::FilterValue,
    "aggregation" => StageKind::Aggregation,
    "downsample" => StageKind::Downsample,
    "rate" => StageKind::Rate,
};

/// Stage sequence used when the query carries no `order` array.
pub const DEFAULT_ORDER: [StageKind; 4] = [
    StageKind::FilterValue,
    StageKind::Aggregation,
    StageKind::Downsample,
    StageKind::Rate,
];

/// Validation walks the stages in a fixed sequence so the reported error
/// is deterministic; aggregation leads because it is always configured.
const VALIDATION_ORDER: [StageKind; 4] = [
    StageKind::Aggregation,
    StageKind::FilterValue,
    StageKind::Downsample,
    StageKind::Rate,
];

/// Which optional stages the query configures. Aggregation is the
/// cross-series combine step and is always on.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ConfiguredStages {
    pub filter_value: bool,
    pub downsample: bool,
    pub rate: bool,
}

impl ConfiguredStages {
    pub fn from_query(query: &SubQuery) -> Self {
        ConfiguredStages {
            filter_value: query.filter_value.is_some(),
            downsample: query.downsample.is_some(),
            rate: query.rate,
        }
    }

    pub fn contains(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::Aggregation => true,
            StageKind::FilterValue => self.filter_value,
            StageKind::Downsample => self.downsample,
            StageKind::Rate => self.rate,
        }
    }
}

/// Resolves the stage execution order for a query.
///
/// With no `order` array the default order applies, restricted to the
/// configured stages. A custom array is validated before anything runs:
/// unrecognized tokens are reported together, every configured stage must
/// appear exactly once, and no stage may appear twice. Tokens naming
/// stages that are not configured are accepted and ignored; empty-string
/// tokens are skipped outright.
pub fn resolve_order(
    order: Option<&[String]>,
    configured: ConfiguredStages,
) -> RuntimeResult<Vec<StageKind>> {
    let Some(tokens) = order else {
        return Ok(DEFAULT_ORDER
            .into_iter()
            .filter(|kind| configured.contains(*kind))
            .collect());
    };

    let mut named = Vec::with_capacity(tokens.len());
    let mut unknown = Vec::new();
    for token in tokens {
        if token.is_empty() {
            continue;
        }
        match STAGE_TOKENS.get(token.as_str()) {
            Some(kind) => named.push(*kind),
            None => unknown.push(token.clone()),
        }
    }
    if !unknown.is_empty() {
        return Err(RuntimeError::InvalidOrderOperations(unknown));
    }

    for kind in VALIDATION_ORDER {
        let count = named.iter().filter(|k| **k == kind).count();
        if count > 1 {
            return Err(RuntimeError::DuplicateStageInOrder(kind));
        }
        if count == 0 && configured.contains(kind) {
            return Err(RuntimeError::StageMissingFromOrder(kind));
        }
    }

    Ok(named
        .into_iter()
        .filter(|kind| configured.contains(*kind))
        .collect())
}
