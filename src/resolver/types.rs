//! Types for resolved batch dependencies

use std::collections::HashMap;

use crate::query::QueryError;

/// RefIds ordered so that every query comes after the queries it references
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationOrder(pub Vec<String>);

impl EvaluationOrder {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Position of a refId in the order
    pub fn position(&self, ref_id: &str) -> Option<usize> {
        self.0.iter().position(|id| id == ref_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of resolving a batch that may be partially invalid
///
/// `order` only lists queries without a reference error, and never a query
/// that depends on a failed one.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub order: EvaluationOrder,
    /// RefIds each expression references, for queries with references
    pub dependencies: HashMap<String, Vec<String>>,
    pub errors: Vec<QueryError>,
}

impl Resolution {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<EvaluationOrder, Vec<QueryError>> {
        if self.errors.is_empty() {
            Ok(self.order)
        } else {
            Err(self.errors)
        }
    }
}
