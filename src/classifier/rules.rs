//! Mode classification
//!
//! Maps a query definition onto exactly one API mode. Rules are evaluated in
//! order and the first match wins:
//! 1. raw editor + query type `Query` → SQL expression
//! 2. non-empty expression → math expression
//! 3. query type `Search` → inferred search expression
//! 4. otherwise → metric stat
//!
//! Rule 1 must stay ahead of rule 2: an expression left behind after
//! switching editors must not turn a SQL query into a math expression.

use tracing::debug;

use crate::query::{MetricEditorMode, MetricQueryType, QueryDefinition};
use super::mode::ApiMode;

/// A query paired with the mode it was classified into
#[derive(Debug, Clone, Copy)]
pub struct Classified<'a> {
    pub query: &'a QueryDefinition,
    pub mode: ApiMode,
}

/// Classify a single query
pub fn classify(def: &QueryDefinition) -> ApiMode {
    if def.editor_mode == MetricEditorMode::Raw && def.query_type == MetricQueryType::Query {
        ApiMode::SqlExpression
    } else if def.has_expression() {
        ApiMode::MathExpression
    } else if def.query_type == MetricQueryType::Search {
        ApiMode::InferredSearchExpression
    } else {
        ApiMode::MetricStat
    }
}

/// Classify every query in a batch, preserving batch order
pub fn classify_batch(defs: &[QueryDefinition]) -> Vec<Classified<'_>> {
    defs.iter()
        .map(|query| {
            let mode = classify(query);
            debug!(
                ref_id = %query.ref_id,
                query_type = %query.query_type,
                editor_mode = %query.editor_mode,
                %mode,
                "classified query"
            );
            Classified { query, mode }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(query_type: MetricQueryType, editor_mode: MetricEditorMode, expression: Option<&str>) -> QueryDefinition {
        QueryDefinition {
            expression: expression.map(str::to_string),
            ..QueryDefinition::new("A", query_type, editor_mode)
        }
    }

    #[test]
    fn test_raw_query_is_sql_regardless_of_fields() {
        let mut q = def(MetricQueryType::Query, MetricEditorMode::Raw, Some("SELECT AVG(CPUUtilization) FROM \"AWS/EC2\""));
        q.statistic = Some("Average".to_string());
        q.period = Some(300);
        q.namespace = Some("AWS/EC2".to_string());
        assert_eq!(classify(&q), ApiMode::SqlExpression);

        let empty = def(MetricQueryType::Query, MetricEditorMode::Raw, None);
        assert_eq!(classify(&empty), ApiMode::SqlExpression);
    }

    #[test]
    fn test_raw_sql_takes_precedence_over_expression() {
        // A leftover math expression must not reclassify a raw SQL query
        let q = def(MetricQueryType::Query, MetricEditorMode::Raw, Some("A * 2"));
        assert_eq!(classify(&q), ApiMode::SqlExpression);
    }

    #[test]
    fn test_builder_expression_is_math() {
        for query_type in [MetricQueryType::Search, MetricQueryType::Query] {
            let q = def(query_type, MetricEditorMode::Builder, Some("SUM(METRICS())"));
            assert_eq!(classify(&q), ApiMode::MathExpression);
        }
    }

    #[test]
    fn test_raw_search_with_expression_is_math() {
        let q = def(MetricQueryType::Search, MetricEditorMode::Raw, Some("A + B"));
        assert_eq!(classify(&q), ApiMode::MathExpression);
    }

    #[test]
    fn test_search_without_expression_is_inferred() {
        for editor_mode in [MetricEditorMode::Builder, MetricEditorMode::Raw] {
            let q = def(MetricQueryType::Search, editor_mode, None);
            assert_eq!(classify(&q), ApiMode::InferredSearchExpression);
        }
        let blank = def(MetricQueryType::Search, MetricEditorMode::Builder, Some("  "));
        assert_eq!(classify(&blank), ApiMode::InferredSearchExpression);
    }

    #[test]
    fn test_builder_query_without_expression_is_metric_stat() {
        let mut q = def(MetricQueryType::Query, MetricEditorMode::Builder, None);
        q.namespace = Some("AWS/EC2".to_string());
        q.metric_name = Some("CPUUtilization".to_string());
        assert_eq!(classify(&q), ApiMode::MetricStat);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let q = def(MetricQueryType::Search, MetricEditorMode::Builder, Some("m1 / m2"));
        assert_eq!(classify(&q), classify(&q));
    }

    #[test]
    fn test_classify_batch_preserves_order() {
        let defs = vec![
            QueryDefinition::new("A", MetricQueryType::Query, MetricEditorMode::Builder),
            QueryDefinition::new("B", MetricQueryType::Query, MetricEditorMode::Raw),
            QueryDefinition::new("C", MetricQueryType::Search, MetricEditorMode::Builder),
        ];
        let classified = classify_batch(&defs);
        let summary: Vec<(&str, ApiMode)> = classified
            .iter()
            .map(|c| (c.query.ref_id.as_str(), c.mode))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", ApiMode::MetricStat),
                ("B", ApiMode::SqlExpression),
                ("C", ApiMode::InferredSearchExpression),
            ]
        );
    }
}
