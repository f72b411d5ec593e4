use std::fmt;

use serde::Serialize;

/// Strategy used to satisfy a query against the metrics API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiMode {
    /// Direct statistic lookup by namespace, metric, dimensions, stat and period
    MetricStat,
    /// Server-side search expression generated from the search criteria
    InferredSearchExpression,
    /// User expression combining other queries' results
    MathExpression,
    /// User-authored query-language text
    #[serde(rename = "SQLExpression")]
    SqlExpression,
}

impl ApiMode {
    /// Modes whose request carries a user expression rather than a statistic
    pub fn is_expression(&self) -> bool {
        matches!(self, ApiMode::MathExpression | ApiMode::SqlExpression)
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiMode::MetricStat => write!(f, "MetricStat"),
            ApiMode::InferredSearchExpression => write!(f, "InferredSearchExpression"),
            ApiMode::MathExpression => write!(f, "MathExpression"),
            ApiMode::SqlExpression => write!(f, "SQLExpression"),
        }
    }
}
