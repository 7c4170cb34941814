use std::collections::BTreeMap;

use ahash::AHashSet;
use regex::Regex;

use tsquery_model::{FilterSpec, FilterType};

use crate::runtime_error::{RuntimeError, RuntimeResult};

/// A compiled per-tag matcher. One variant per filter type; compilation
/// happens once per query, matching once per candidate series.
#[derive(Debug, Clone)]
pub enum TagMatcher {
    /// Anchored regular expression over the whole tag value.
    Regexp(Regex),
    /// Wildcard pattern with `*` expanded to any run of characters.
    Wildcard(Regex),
    /// Case-sensitive membership in a `|`-separated literal set.
    LiteralOr(AHashSet<String>),
    /// Case-sensitive non-membership in a `|`-separated literal set.
    NotLiteralOr(AHashSet<String>),
    /// Case-insensitive membership in a `|`-separated literal set.
    ILiteralOr(AHashSet<String>),
}

impl TagMatcher {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TagMatcher::Regexp(re) | TagMatcher::Wildcard(re) => re.is_match(value),
            TagMatcher::LiteralOr(set) => set.contains(value),
            TagMatcher::NotLiteralOr(set) => !set.contains(value),
            TagMatcher::ILiteralOr(set) => set.contains(&value.to_lowercase()),
        }
    }
}

/// A filter compiled against one tag key.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub tagk: String,
    pub group_by: bool,
    matcher: TagMatcher,
}

impl CompiledFilter {
    /// True when the tag map carries `tagk` and its value satisfies the
    /// matcher. A series without the key never matches, negated sets
    /// included.
    pub fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        tags.get(&self.tagk)
            .is_some_and(|value| self.matcher.matches(value))
    }
}

pub fn compile_filter(spec: &FilterSpec) -> RuntimeResult<CompiledFilter> {
    spec.validate()?;
    let matcher = match spec.kind {
        FilterType::Regexp => TagMatcher::Regexp(anchored(&spec.filter)?),
        FilterType::Wildcard => TagMatcher::Wildcard(anchored(&wildcard_pattern(&spec.filter))?),
        FilterType::LiteralOr => TagMatcher::LiteralOr(literal_set(&spec.filter)),
        FilterType::NotLiteralOr => TagMatcher::NotLiteralOr(literal_set(&spec.filter)),
        FilterType::ILiteralOr => {
            TagMatcher::ILiteralOr(literal_set(&spec.filter.to_lowercase()))
        }
    };
    Ok(CompiledFilter {
        tagk: spec.tagk.clone(),
        group_by: spec.group_by,
        matcher,
    })
}

pub fn compile_filters(specs: &[FilterSpec]) -> RuntimeResult<Vec<CompiledFilter>> {
    specs.iter().map(compile_filter).collect()
}

/// True when the tag map satisfies every filter. Filters sharing a tag key
/// intersect, so filter order never affects the outcome.
pub fn series_matches(tags: &BTreeMap<String, String>, filters: &[CompiledFilter]) -> bool {
    filters.iter().all(|filter| filter.matches(tags))
}

/// Translates a query's exact `tags` map into group-by filters: `*` turns
/// into a wildcard, a `|`-separated value into a literal set, anything
/// else into a single-element literal set.
pub fn filters_from_tags(tags: &BTreeMap<String, String>) -> Vec<FilterSpec> {
    tags.iter()
        .map(|(tagk, tagv)| {
            let kind = if tagv.contains('*') {
                FilterType::Wildcard
            } else {
                FilterType::LiteralOr
            };
            FilterSpec::new(kind, tagk, tagv).group_by(true)
        })
        .collect()
}

fn anchored(pattern: &str) -> RuntimeResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|_| RuntimeError::InvalidRegex(pattern.to_string()))
}

fn wildcard_pattern(pattern: &str) -> String {
    pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

fn literal_set(pattern: &str) -> AHashSet<String> {
    pattern.split('|').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn compiled(kind: FilterType, tagk: &str, pattern: &str) -> CompiledFilter {
        compile_filter(&FilterSpec::new(kind, tagk, pattern)).unwrap()
    }

    #[test]
    fn regexp_is_anchored() {
        let filter = compiled(FilterType::Regexp, "host", "web[0-9]");
        assert!(filter.matches(&tags(&[("host", "web1")])));
        assert!(!filter.matches(&tags(&[("host", "web12")])));
        assert!(!filter.matches(&tags(&[("host", "xweb1")])));
    }

    #[test]
    fn regexp_rejects_bad_patterns() {
        let err = compile_filter(&FilterSpec::new(FilterType::Regexp, "host", "web[")).unwrap_err();
        assert_eq!(err, RuntimeError::InvalidRegex("web[".to_string()));
    }

    #[test_case("web*", "web01", true)]
    #[test_case("web*", "web", true ; "star matches the empty run")]
    #[test_case("web*", "db01", false)]
    #[test_case("*", "anything", true)]
    #[test_case("w*b", "web", true ; "interior star")]
    #[test_case("w*b", "webs", false)]
    fn wildcard_matching(pattern: &str, value: &str, expected: bool) {
        let filter = compiled(FilterType::Wildcard, "host", pattern);
        assert_eq!(filter.matches(&tags(&[("host", value)])), expected);
    }

    #[test]
    fn wildcard_escapes_regex_metacharacters() {
        let filter = compiled(FilterType::Wildcard, "host", "web.0*");
        assert!(filter.matches(&tags(&[("host", "web.01")])));
        assert!(!filter.matches(&tags(&[("host", "webx01")])));
    }

    #[test]
    fn literal_or_is_case_sensitive() {
        let filter = compiled(FilterType::LiteralOr, "host", "web01|web02");
        assert!(filter.matches(&tags(&[("host", "web01")])));
        assert!(!filter.matches(&tags(&[("host", "WEB01")])));
        assert!(!filter.matches(&tags(&[("host", "web03")])));
    }

    #[test]
    fn not_literal_or_negates_membership() {
        let filter = compiled(FilterType::NotLiteralOr, "host", "web01");
        assert!(!filter.matches(&tags(&[("host", "web01")])));
        assert!(filter.matches(&tags(&[("host", "web02")])));
        // Still requires the key to be present.
        assert!(!filter.matches(&tags(&[("dc", "east")])));
    }

    #[test]
    fn iliteral_or_folds_case() {
        let filter = compiled(FilterType::ILiteralOr, "host", "Web01|WEB02");
        assert!(filter.matches(&tags(&[("host", "web01")])));
        assert!(filter.matches(&tags(&[("host", "wEb02")])));
        assert!(!filter.matches(&tags(&[("host", "web03")])));
    }

    #[test]
    fn filters_on_the_same_key_intersect() {
        let filters = vec![
            compiled(FilterType::Wildcard, "host", "*"),
            compiled(FilterType::LiteralOr, "host", "host3"),
        ];
        assert!(series_matches(&tags(&[("host", "host3")]), &filters));
        assert!(!series_matches(&tags(&[("host", "host1")]), &filters));
    }

    #[test]
    fn tags_map_translates_to_group_by_filters() {
        let map = tags(&[("host", "*"), ("dc", "east|west"), ("rack", "r1")]);
        let specs = filters_from_tags(&map);
        assert_eq!(specs.len(), 3);
        assert!(specs.iter().all(|s| s.group_by));
        let by_key = |k: &str| specs.iter().find(|s| s.tagk == k).unwrap();
        assert_eq!(by_key("host").kind, FilterType::Wildcard);
        assert_eq!(by_key("dc").kind, FilterType::LiteralOr);
        assert_eq!(by_key("rack").kind, FilterType::LiteralOr);
    }
}
