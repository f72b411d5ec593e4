use std::collections::BTreeMap;

use serde::Deserialize;

/// Dimension filter values as they arrive on the wire
///
/// The editor sends either a single value or a list of values per dimension.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DimensionValues {
    /// Shorthand: "InstanceId": "i-123"
    One(String),
    /// "InstanceId": ["i-123", "i-456"]
    Many(Vec<String>),
}

impl DimensionValues {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            DimensionValues::One(value) => vec![value],
            DimensionValues::Many(values) => values,
        }
    }
}

/// A query exactly as authored in the editor, before validation
///
/// Enum-like fields and the period are kept as raw JSON values so that
/// malformed input can be reported against the query's refId instead of
/// failing deserialization of the whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuery {
    #[serde(default)]
    pub ref_id: String,
    /// `0`/`"search"` or `1`/`"query"`
    #[serde(default, alias = "metricQueryType")]
    pub query_type: Option<serde_json::Value>,
    /// `0`/`"builder"` or `1`/`"code"`
    #[serde(default, alias = "metricEditorMode")]
    pub editor_mode: Option<serde_json::Value>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default, alias = "stat")]
    pub statistic: Option<String>,
    /// Seconds, as a number or a numeric string
    #[serde(default)]
    pub period: Option<serde_json::Value>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub dimensions: Option<BTreeMap<String, DimensionValues>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub match_exact: Option<bool>,
}
