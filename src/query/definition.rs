//! Validated query definitions

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::error::{QueryError, QueryErrorKind};
use super::raw::RawQuery;

/// Dimension filters keyed by dimension name; `"*"` is a wildcard value
pub type Dimensions = BTreeMap<String, Vec<String>>;

/// Value that matches any dimension value
pub const WILDCARD: &str = "*";

/// Whether a query resolves via metric search or via the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetricQueryType {
    #[default]
    Search,
    Query,
}

impl MetricQueryType {
    /// Decode the wire value (`0`/`"search"`, `1`/`"query"`)
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64()? {
                0 => Some(Self::Search),
                1 => Some(Self::Query),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "search" => Some(Self::Search),
                "query" => Some(Self::Query),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for MetricQueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Whether the query was assembled in the structured builder or typed as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetricEditorMode {
    #[default]
    Builder,
    Raw,
}

impl MetricEditorMode {
    /// Decode the wire value (`0`/`"builder"`, `1`/`"code"`/`"raw"`)
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64()? {
                0 => Some(Self::Builder),
                1 => Some(Self::Raw),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "builder" => Some(Self::Builder),
                "code" | "raw" => Some(Self::Raw),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for MetricEditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builder => write!(f, "builder"),
            Self::Raw => write!(f, "code"),
        }
    }
}

/// One user query, validated and ready for classification
///
/// Empty strings from the editor are normalized to `None`, so presence
/// checks downstream only need to look at the `Option`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefinition {
    pub ref_id: String,
    pub query_type: MetricQueryType,
    pub editor_mode: MetricEditorMode,
    /// Math or SQL body, depending on the editor mode and query type
    pub expression: Option<String>,
    pub statistic: Option<String>,
    /// Seconds
    pub period: Option<u32>,
    pub label: Option<String>,
    pub namespace: Option<String>,
    pub metric_name: Option<String>,
    pub dimensions: Dimensions,
    /// Target region; the display context region is used when absent
    pub region: Option<String>,
    /// Restrict inferred searches to metrics with exactly these dimensions
    pub match_exact: bool,
}

impl Default for QueryDefinition {
    fn default() -> Self {
        Self {
            ref_id: String::new(),
            query_type: MetricQueryType::default(),
            editor_mode: MetricEditorMode::default(),
            expression: None,
            statistic: None,
            period: None,
            label: None,
            namespace: None,
            metric_name: None,
            dimensions: Dimensions::new(),
            region: None,
            match_exact: true,
        }
    }
}

impl QueryDefinition {
    pub fn new(ref_id: impl Into<String>, query_type: MetricQueryType, editor_mode: MetricEditorMode) -> Self {
        Self {
            ref_id: ref_id.into(),
            query_type,
            editor_mode,
            ..Default::default()
        }
    }

    /// Validate a raw editor query
    ///
    /// Fails with `InvalidQueryType`, `InvalidEditorMode` or `InvalidPeriod`
    /// attributed to the query's refId.
    pub fn from_raw(raw: RawQuery) -> Result<Self, QueryError> {
        let ref_id = raw.ref_id;
        let fail = |kind| QueryError::new(ref_id.clone(), kind);

        let query_type = match &raw.query_type {
            None | Some(Value::Null) => MetricQueryType::default(),
            Some(value) => MetricQueryType::from_wire(value)
                .ok_or_else(|| fail(QueryErrorKind::InvalidQueryType(value.to_string())))?,
        };

        let editor_mode = match &raw.editor_mode {
            None | Some(Value::Null) => MetricEditorMode::default(),
            Some(value) => MetricEditorMode::from_wire(value)
                .ok_or_else(|| fail(QueryErrorKind::InvalidEditorMode(value.to_string())))?,
        };

        let period = match &raw.period {
            None => None,
            Some(value) => parse_period(value).map_err(fail)?,
        };

        let dimensions = raw
            .dimensions
            .unwrap_or_default()
            .into_iter()
            .map(|(key, values)| (key, values.into_vec()))
            .collect();

        Ok(Self {
            ref_id,
            query_type,
            editor_mode,
            expression: non_empty(raw.expression),
            statistic: non_empty(raw.statistic),
            period,
            label: non_empty(raw.label),
            namespace: non_empty(raw.namespace),
            metric_name: non_empty(raw.metric_name),
            dimensions,
            region: non_empty(raw.region),
            match_exact: raw.match_exact.unwrap_or(true),
        })
    }

    /// The expression body, if one was entered
    ///
    /// Whitespace-only bodies count as absent.
    pub fn expression_text(&self) -> Option<&str> {
        self.expression.as_deref().filter(|e| !e.trim().is_empty())
    }

    pub fn has_expression(&self) -> bool {
        self.expression_text().is_some()
    }

    pub fn has_dimensions(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

impl TryFrom<RawQuery> for QueryDefinition {
    type Error = QueryError;

    fn try_from(raw: RawQuery) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse a period given as a number or a numeric string
///
/// An empty string means the period was left blank.
fn parse_period(value: &Value) -> Result<Option<u32>, QueryErrorKind> {
    let invalid = || QueryErrorKind::InvalidPeriod(value.to_string());
    let seconds = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().ok_or_else(invalid)?,
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    match u32::try_from(seconds) {
        Ok(period) if period > 0 => Ok(Some(period)),
        _ => Err(invalid()),
    }
}
