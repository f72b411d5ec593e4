use crate::classifier::{ApiMode, Classified};
use crate::query::{QueryDefinition, QueryError, QueryErrorKind};
use crate::request::{MetricDataRequest, MetricExpression, MetricStatMeta, MetricStatParams, RequestParams, SearchParams};
use super::search::{build_search_expression, SearchCriteria};

/// Statistic used by inferred searches that leave it blank
pub const DEFAULT_SEARCH_STATISTIC: &str = "Average";

/// Period (seconds) used by inferred searches that leave it blank
pub const DEFAULT_SEARCH_PERIOD: u32 = 300;

/// Build the API request parameters for a query in the given mode
///
/// Pure translation and validation; the first missing field is reported in
/// a fixed order so that the same query always yields the same error.
pub fn build(def: &QueryDefinition, mode: ApiMode) -> Result<RequestParams, QueryError> {
    match mode {
        ApiMode::MetricStat => build_metric_stat(def).map(RequestParams::MetricStat),
        ApiMode::InferredSearchExpression => build_search(def).map(RequestParams::InferredSearchExpression),
        ApiMode::MathExpression => build_expression(def).map(RequestParams::MathExpression),
        ApiMode::SqlExpression => build_expression(def).map(RequestParams::SqlExpression),
    }
}

/// Build a request for an already classified query
pub fn build_request(classified: &Classified<'_>) -> Result<MetricDataRequest, QueryError> {
    let params = build(classified.query, classified.mode)?;
    Ok(MetricDataRequest {
        ref_id: classified.query.ref_id.clone(),
        params,
    })
}

fn build_metric_stat(def: &QueryDefinition) -> Result<MetricStatParams, QueryError> {
    // namespace → metricName → statistic → period
    let namespace = require(def, def.namespace.as_deref(), "namespace")?;
    let metric_name = require(def, def.metric_name.as_deref(), "metricName")?;
    let stat = require(def, def.statistic.as_deref(), "statistic")?;
    let period = def.period.ok_or_else(|| missing(def, "period"))?;

    Ok(MetricStatParams {
        namespace: namespace.to_string(),
        metric_name: metric_name.to_string(),
        dimensions: def.dimensions.clone(),
        meta: MetricStatMeta {
            stat: stat.to_string(),
            period,
            label: def.label.clone(),
        },
    })
}

fn build_search(def: &QueryDefinition) -> Result<SearchParams, QueryError> {
    let namespace = require(def, def.namespace.as_deref(), "namespace")?;
    if def.metric_name.is_none() && !def.has_dimensions() {
        return Err(missing(def, "metricName"));
    }

    let stat = def.statistic.as_deref().unwrap_or(DEFAULT_SEARCH_STATISTIC);
    let period = def.period.unwrap_or(DEFAULT_SEARCH_PERIOD);
    let expression = build_search_expression(&SearchCriteria {
        namespace,
        metric_name: def.metric_name.as_deref(),
        dimensions: &def.dimensions,
        match_exact: def.match_exact,
        stat,
        period,
    });

    Ok(SearchParams {
        namespace: namespace.to_string(),
        metric_name: def.metric_name.clone(),
        dimensions: def.dimensions.clone(),
        expression,
        meta: MetricStatMeta {
            stat: stat.to_string(),
            period,
            label: def.label.clone(),
        },
    })
}

fn build_expression(def: &QueryDefinition) -> Result<MetricExpression, QueryError> {
    let expression = def
        .expression_text()
        .ok_or_else(|| QueryError::new(def.ref_id.clone(), QueryErrorKind::EmptyExpression))?;
    Ok(MetricExpression {
        expression: expression.to_string(),
        label: def.label.clone(),
    })
}

fn require<'a>(def: &QueryDefinition, value: Option<&'a str>, field: &'static str) -> Result<&'a str, QueryError> {
    value.ok_or_else(|| missing(def, field))
}

fn missing(def: &QueryDefinition, field: &'static str) -> QueryError {
    QueryError::new(def.ref_id.clone(), QueryErrorKind::MissingField(field))
}
