//! Request payloads handed to the metrics API client

use serde::Serialize;

use crate::classifier::ApiMode;
use crate::query::Dimensions;

/// Statistic settings for stat and search requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricStatMeta {
    pub stat: String,
    /// Seconds
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Expression body for math and SQL requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricExpression {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Direct statistic lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatParams {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Dimensions,
    pub meta: MetricStatMeta,
}

/// Search criteria plus the search expression generated from them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    pub dimensions: Dimensions,
    /// e.g. `REMOVE_EMPTY(SEARCH('{"AWS/EC2","InstanceId"} MetricName="CPUUtilization"', 'Average', 300))`
    pub expression: String,
    pub meta: MetricStatMeta,
}

/// Mode-specific request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode")]
pub enum RequestParams {
    MetricStat(MetricStatParams),
    InferredSearchExpression(SearchParams),
    MathExpression(MetricExpression),
    #[serde(rename = "SQLExpression")]
    SqlExpression(MetricExpression),
}

impl RequestParams {
    /// The mode these parameters were built for
    pub fn mode(&self) -> ApiMode {
        match self {
            RequestParams::MetricStat(_) => ApiMode::MetricStat,
            RequestParams::InferredSearchExpression(_) => ApiMode::InferredSearchExpression,
            RequestParams::MathExpression(_) => ApiMode::MathExpression,
            RequestParams::SqlExpression(_) => ApiMode::SqlExpression,
        }
    }

    /// Statistic metadata (stat and search requests only)
    pub fn stat_meta(&self) -> Option<&MetricStatMeta> {
        match self {
            RequestParams::MetricStat(p) => Some(&p.meta),
            RequestParams::InferredSearchExpression(p) => Some(&p.meta),
            _ => None,
        }
    }

    /// Expression payload (math and SQL requests only)
    pub fn metric_expression(&self) -> Option<&MetricExpression> {
        match self {
            RequestParams::MathExpression(e) | RequestParams::SqlExpression(e) => Some(e),
            _ => None,
        }
    }
}

/// A built request, attributed to its query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDataRequest {
    pub ref_id: String,
    #[serde(flatten)]
    pub params: RequestParams,
}

impl MetricDataRequest {
    pub fn mode(&self) -> ApiMode {
        self.params.mode()
    }
}
