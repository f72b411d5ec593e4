//! Per-query error types

use std::fmt;

/// Cause of a single query failing validation, resolution or building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Math expression references a refId that is not in the batch
    UnknownReference(String),
    /// Expression is part of a reference cycle (members in batch order)
    CyclicReference(Vec<String>),
    /// Expression references a query that failed, so it cannot be evaluated
    DependencyFailed(String),
    /// A field required by the query's API mode is absent
    MissingField(&'static str),
    /// Math or SQL mode without an expression body
    EmptyExpression,
    /// Query type is neither search nor query
    InvalidQueryType(String),
    /// Editor mode is neither builder nor code
    InvalidEditorMode(String),
    /// Period is not a positive number of seconds
    InvalidPeriod(String),
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::UnknownReference(id) => {
                write!(f, "expression references unknown query '{}'", id)
            }
            QueryErrorKind::CyclicReference(members) => {
                write!(f, "cyclic reference between queries [{}]", members.join(", "))
            }
            QueryErrorKind::DependencyFailed(id) => {
                write!(f, "depends on query '{}' which failed", id)
            }
            QueryErrorKind::MissingField(field) => write!(f, "missing required field '{}'", field),
            QueryErrorKind::EmptyExpression => write!(f, "expression must not be empty"),
            QueryErrorKind::InvalidQueryType(value) => {
                write!(f, "invalid query type {}, expected 'search' or 'query'", value)
            }
            QueryErrorKind::InvalidEditorMode(value) => {
                write!(f, "invalid editor mode {}, expected 'builder' or 'code'", value)
            }
            QueryErrorKind::InvalidPeriod(value) => {
                write!(f, "invalid period {}, expected a positive number of seconds", value)
            }
        }
    }
}

impl std::error::Error for QueryErrorKind {}

/// An error attributed to the query that caused it
///
/// The host reports these against the originating panel/series, so a
/// `QueryError` always carries the refId of the failing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub ref_id: String,
    pub kind: QueryErrorKind,
}

impl QueryError {
    pub fn new(ref_id: impl Into<String>, kind: QueryErrorKind) -> Self {
        Self {
            ref_id: ref_id.into(),
            kind,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error parsing query {:?}, {}", self.ref_id, self.kind)
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors that reject a whole batch before any query is classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Batch contains no queries
    EmptyBatch,
    /// Query at this position has an empty refId
    MissingRefId { index: usize },
    /// Two or more queries share this refId
    DuplicateRefId(String),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::EmptyBatch => write!(f, "Batch contains no queries"),
            BatchError::MissingRefId { index } => {
                write!(f, "Query at position {} has no refId", index)
            }
            BatchError::DuplicateRefId(id) => {
                write!(f, "refId '{}' is used by more than one query", id)
            }
        }
    }
}

impl std::error::Error for BatchError {}
