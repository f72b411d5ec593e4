//! Search expression generation for inferred search queries

use crate::query::{Dimensions, WILDCARD};

/// Criteria an inferred search is generated from
#[derive(Debug, Clone, Copy)]
pub struct SearchCriteria<'a> {
    pub namespace: &'a str,
    pub metric_name: Option<&'a str>,
    pub dimensions: &'a Dimensions,
    pub match_exact: bool,
    pub stat: &'a str,
    pub period: u32,
}

/// Build the `REMOVE_EMPTY(SEARCH(...))` expression for a search query
///
/// Dimensions with concrete values become `"key"="value"` filters (several
/// values are OR-ed). With `match_exact` the search is scoped to the schema
/// made of the namespace and every dimension name; otherwise the namespace is
/// a filter and wildcard dimensions only require the dimension to exist.
pub fn build_search_expression(criteria: &SearchCriteria<'_>) -> String {
    let mut terms: Vec<String> = Vec::new();
    if let Some(metric_name) = criteria.metric_name {
        terms.push(format!("MetricName=\"{}\"", escape_double_quotes(metric_name)));
    }

    let mut wildcard_keys: Vec<&str> = Vec::new();
    for (key, values) in criteria.dimensions {
        if values.is_empty() || values.iter().any(|v| v == WILDCARD) {
            wildcard_keys.push(key);
            continue;
        }
        let quoted: Vec<String> = values
            .iter()
            .map(|v| format!("\"{}\"", escape_double_quotes(v)))
            .collect();
        let value_expr = if quoted.len() > 1 {
            format!("({})", quoted.join(" OR "))
        } else {
            quoted.join("")
        };
        terms.push(format!("\"{}\"={}", escape_double_quotes(key), value_expr));
    }

    let search = if criteria.match_exact {
        let mut schema = vec![format!("\"{}\"", escape_double_quotes(criteria.namespace))];
        schema.extend(
            criteria
                .dimensions
                .keys()
                .map(|key| format!("\"{}\"", escape_double_quotes(key))),
        );
        let mut parts = vec![format!("{{{}}}", schema.join(","))];
        parts.extend(terms);
        parts.join(" ")
    } else {
        let mut parts = vec![format!("Namespace=\"{}\"", escape_double_quotes(criteria.namespace))];
        parts.extend(terms);
        parts.extend(wildcard_keys.iter().map(|key| format!("\"{}\"", escape_double_quotes(key))));
        parts.join(" ")
    };

    format!("REMOVE_EMPTY(SEARCH('{}', '{}', {}))", search, criteria.stat, criteria.period)
}

fn escape_double_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}
