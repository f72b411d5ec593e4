use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::classifier::{ApiMode, Classified};
use crate::query::{QueryError, QueryErrorKind};
use super::recognizer::{MathReferenceRecognizer, ReferenceRecognizer};
use super::types::{EvaluationOrder, Resolution};

/// Resolve math expression references using the default recognizer
///
/// Every failure in the batch is reported, not just the first one.
pub fn resolve_dependencies(batch: &[Classified<'_>]) -> Result<EvaluationOrder, Vec<QueryError>> {
    resolve_with(batch, &MathReferenceRecognizer)
}

/// Resolve math expression references with a caller-supplied recognizer
pub fn resolve_with<R>(batch: &[Classified<'_>], recognizer: &R) -> Result<EvaluationOrder, Vec<QueryError>>
where
    R: ReferenceRecognizer + ?Sized,
{
    resolve_partial(batch, recognizer).into_result()
}

/// Resolve a batch, keeping the order for the queries that did resolve
///
/// The batch must be complete: a reference to a query that was left out is
/// reported as unknown.
pub fn resolve_partial<R>(batch: &[Classified<'_>], recognizer: &R) -> Resolution
where
    R: ReferenceRecognizer + ?Sized,
{
    resolve_against(batch, &HashSet::new(), recognizer)
}

/// Resolve a batch in which some refIds already failed
///
/// A reference to one of the `unavailable` refIds, to a query on a cycle, or
/// to any query that failed in turn is a `DependencyFailed` error.
///
/// # Arguments
/// * `batch` - Every classified query of the request
/// * `unavailable` - RefIds of the request that were dropped before classification
/// * `recognizer` - Extracts referenced identifiers from expression text
pub fn resolve_against<R>(batch: &[Classified<'_>], unavailable: &HashSet<&str>, recognizer: &R) -> Resolution
where
    R: ReferenceRecognizer + ?Sized,
{
    let index: HashMap<&str, usize> = batch
        .iter()
        .enumerate()
        .map(|(i, c)| (c.query.ref_id.as_str(), i))
        .collect();

    // 1. Build the reference graph, reporting references that cannot be met
    let mut errors: Vec<(usize, QueryError)> = Vec::new();
    let mut failed = vec![false; batch.len()];
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); batch.len()];
    for (i, classified) in batch.iter().enumerate() {
        if classified.mode != ApiMode::MathExpression {
            continue;
        }
        let Some(expression) = classified.query.expression_text() else {
            continue;
        };
        let ref_id = &classified.query.ref_id;
        for name in recognizer.references(expression) {
            if let Some(&target) = index.get(name) {
                debug!(ref_id = %ref_id, references = name, "resolved expression reference");
                edges[i].push(target);
                continue;
            }
            let kind = if unavailable.contains(name) {
                QueryErrorKind::DependencyFailed(name.to_string())
            } else {
                QueryErrorKind::UnknownReference(name.to_string())
            };
            debug!(ref_id = %ref_id, references = name, error = %kind, "unresolved expression reference");
            errors.push((i, QueryError::new(ref_id.clone(), kind)));
            failed[i] = true;
        }
    }

    // 2. Every query on a cycle gets its own error naming the whole cycle
    for component in strongly_connected(&edges) {
        let is_cycle = component.len() > 1 || edges[component[0]].contains(&component[0]);
        if !is_cycle {
            continue;
        }
        let mut members = component;
        members.sort_unstable();
        let names: Vec<String> = members.iter().map(|&i| batch[i].query.ref_id.clone()).collect();
        debug!(members = ?names, "cyclic expression references");
        for &i in &members {
            errors.push((
                i,
                QueryError::new(batch[i].query.ref_id.clone(), QueryErrorKind::CyclicReference(names.clone())),
            ));
            failed[i] = true;
        }
    }

    // 3. Failures flow to dependents; dependencies are visited first
    let walk = dependency_order(&edges);
    for &i in &walk {
        if failed[i] {
            continue;
        }
        if let Some(&target) = edges[i].iter().find(|&&t| failed[t]) {
            let dependency = batch[target].query.ref_id.clone();
            debug!(ref_id = %batch[i].query.ref_id, dependency = %dependency, "dependency failed");
            errors.push((
                i,
                QueryError::new(batch[i].query.ref_id.clone(), QueryErrorKind::DependencyFailed(dependency)),
            ));
            failed[i] = true;
        }
    }

    // 4. Dependencies first, otherwise batch order
    let order = walk
        .into_iter()
        .filter(|&i| !failed[i])
        .map(|i| batch[i].query.ref_id.clone())
        .collect();

    let dependencies: HashMap<String, Vec<String>> = edges
        .iter()
        .enumerate()
        .filter(|(_, targets)| !targets.is_empty())
        .map(|(i, targets)| {
            let names: Vec<String> = targets.iter().map(|&t| batch[t].query.ref_id.clone()).collect();
            (batch[i].query.ref_id.clone(), names)
        })
        .collect();

    errors.sort_by_key(|(i, _)| *i);
    Resolution {
        order: EvaluationOrder(order),
        dependencies,
        errors: errors.into_iter().map(|(_, e)| e).collect(),
    }
}

/// Post-order walk over the reference graph; edges closing a cycle are ignored
///
/// Iterative, so a long reference chain cannot exhaust the call stack.
fn dependency_order(edges: &[Vec<usize>]) -> Vec<usize> {
    let mut visited = vec![false; edges.len()];
    let mut order = Vec::with_capacity(edges.len());
    // (node, next edge to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..edges.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (v, edge) = *frame;
            match edges[v].get(edge) {
                Some(&w) => {
                    frame.1 += 1;
                    if !visited[w] {
                        visited[w] = true;
                        stack.push((w, 0));
                    }
                }
                None => {
                    stack.pop();
                    order.push(v);
                }
            }
        }
    }
    order
}

/// Tarjan's strongly connected components, with an explicit call stack
fn strongly_connected(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = edges.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut next = 0;
    let mut components = Vec::new();
    // (node, next edge to follow)
    let mut calls: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        calls.push((root, 0));

        while let Some(frame) = calls.last_mut() {
            let (v, edge) = *frame;
            if index[v].is_none() {
                index[v] = Some(next);
                lowlink[v] = next;
                next += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            if let Some(&w) = edges[v].get(edge) {
                frame.1 += 1;
                match index[w] {
                    None => calls.push((w, 0)),
                    Some(w_index) if on_stack[w] => lowlink[v] = lowlink[v].min(w_index),
                    Some(_) => {}
                }
                continue;
            }

            // Every edge of v is done
            calls.pop();
            if index[v] == Some(lowlink[v]) {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
            if let Some(&(parent, _)) = calls.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_batch;
    use crate::query::{MetricEditorMode, MetricQueryType, QueryDefinition};

    fn stat(ref_id: &str) -> QueryDefinition {
        QueryDefinition::new(ref_id, MetricQueryType::Query, MetricEditorMode::Builder)
    }

    fn math(ref_id: &str, expression: &str) -> QueryDefinition {
        QueryDefinition {
            expression: Some(expression.to_string()),
            ..stat(ref_id)
        }
    }

    #[test]
    fn test_dependencies_come_first() {
        let defs = vec![math("B", "A * 100"), stat("A"), math("C", "B + A")];
        let batch = classify_batch(&defs);
        let order = resolve_dependencies(&batch).unwrap();
        assert_eq!(order.0, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_independent_queries_keep_batch_order() {
        let defs = vec![stat("X"), stat("Y"), stat("Z")];
        let batch = classify_batch(&defs);
        let order = resolve_dependencies(&batch).unwrap();
        assert_eq!(order.0, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_mutual_cycle_reports_both() {
        let defs = vec![math("A", "B + 1"), math("B", "A + 1")];
        let batch = classify_batch(&defs);
        let errors = resolve_dependencies(&batch).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].ref_id, "A");
        assert_eq!(errors[1].ref_id, "B");
        let cycle = vec!["A".to_string(), "B".to_string()];
        for err in &errors {
            assert_eq!(err.kind, QueryErrorKind::CyclicReference(cycle.clone()));
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let defs = vec![math("A", "A * 2")];
        let batch = classify_batch(&defs);
        let errors = resolve_dependencies(&batch).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, QueryErrorKind::CyclicReference(vec!["A".to_string()]));
    }

    #[test]
    fn test_unknown_reference() {
        let defs = vec![math("C", "Z * 2")];
        let batch = classify_batch(&defs);
        let errors = resolve_dependencies(&batch).unwrap_err();
        assert_eq!(
            errors,
            vec![QueryError::new("C", QueryErrorKind::UnknownReference("Z".to_string()))]
        );
    }

    #[test]
    fn test_all_failures_collected() {
        let defs = vec![
            stat("A"),
            math("B", "missing + A"),
            math("C", "D"),
            math("D", "C"),
            math("E", "A / 2"),
        ];
        let batch = classify_batch(&defs);
        let resolution = resolve_partial(&batch, &MathReferenceRecognizer);

        let failed: Vec<&str> = resolution.errors.iter().map(|e| e.ref_id.as_str()).collect();
        assert_eq!(failed, vec!["B", "C", "D"]);
        assert_eq!(resolution.order.0, vec!["A", "E"]);
    }

    #[test]
    fn test_dependents_of_failures_fail() {
        let defs = vec![
            math("D", "C + 1"),
            math("A", "B + 1"),
            math("B", "A + 1"),
            math("C", "A * 2"),
            stat("E"),
            math("F", "missing * 2"),
            math("G", "F + E"),
        ];
        let batch = classify_batch(&defs);
        let resolution = resolve_partial(&batch, &MathReferenceRecognizer);

        let kinds: Vec<(&str, &QueryErrorKind)> =
            resolution.errors.iter().map(|e| (e.ref_id.as_str(), &e.kind)).collect();
        let cycle = QueryErrorKind::CyclicReference(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            kinds,
            vec![
                ("D", &QueryErrorKind::DependencyFailed("C".to_string())),
                ("A", &cycle),
                ("B", &cycle),
                ("C", &QueryErrorKind::DependencyFailed("A".to_string())),
                ("F", &QueryErrorKind::UnknownReference("missing".to_string())),
                ("G", &QueryErrorKind::DependencyFailed("F".to_string())),
            ]
        );
        assert_eq!(resolution.order.0, vec!["E"]);
    }

    #[test]
    fn test_unavailable_reference_is_a_failed_dependency() {
        let defs = vec![math("B", "A * 2"), math("C", "B - Z")];
        let batch = classify_batch(&defs);
        let unavailable: HashSet<&str> = ["A"].into_iter().collect();
        let resolution = resolve_against(&batch, &unavailable, &MathReferenceRecognizer);

        assert_eq!(
            resolution.errors,
            vec![
                QueryError::new("B", QueryErrorKind::DependencyFailed("A".to_string())),
                QueryError::new("C", QueryErrorKind::UnknownReference("Z".to_string())),
            ]
        );
        assert!(resolution.order.is_empty());
    }

    #[test]
    fn test_dependencies_are_recorded() {
        let defs = vec![stat("A"), stat("B"), math("C", "A / B"), math("D", "FILL(C, REPEAT)")];
        let batch = classify_batch(&defs);
        let resolution = resolve_partial(&batch, &MathReferenceRecognizer);

        assert!(resolution.is_ok());
        assert_eq!(resolution.dependencies["C"], vec!["A".to_string(), "B".to_string()]);
        assert_eq!(resolution.dependencies["D"], vec!["C".to_string()]);
        assert!(!resolution.dependencies.contains_key("A"));
    }

    #[test]
    fn test_long_reference_chain() {
        const LEN: usize = 50_000;
        let mut defs = vec![stat("q0")];
        defs.extend((1..LEN).map(|i| math(&format!("q{}", i), &format!("q{} + 1", i - 1))));
        defs.reverse();
        let batch = classify_batch(&defs);

        let order = resolve_dependencies(&batch).unwrap();
        assert_eq!(order.len(), LEN);
        assert_eq!(order.0.first().map(String::as_str), Some("q0"));
        assert_eq!(order.0.last().map(String::as_str), Some("q49999"));

        // A failure at the root reaches every query of the chain
        defs[LEN - 1] = math("q0", "missing");
        let batch = classify_batch(&defs);
        let resolution = resolve_partial(&batch, &MathReferenceRecognizer);
        assert_eq!(resolution.errors.len(), LEN);
        assert!(resolution.order.is_empty());
        let last = resolution.errors.first().unwrap();
        assert_eq!(last.ref_id, "q49999");
        assert_eq!(last.kind, QueryErrorKind::DependencyFailed("q49998".to_string()));
    }

    #[test]
    fn test_sql_expressions_are_not_scanned() {
        let defs = vec![QueryDefinition {
            expression: Some("SELECT AVG(CPUUtilization) FROM SCHEMA(\"AWS/EC2\", InstanceId)".to_string()),
            ..QueryDefinition::new("S", MetricQueryType::Query, MetricEditorMode::Raw)
        }];
        let batch = classify_batch(&defs);
        assert_eq!(resolve_dependencies(&batch).unwrap().0, vec!["S"]);
    }

    #[test]
    fn test_custom_recognizer() {
        struct Bracketed;

        impl ReferenceRecognizer for Bracketed {
            fn references<'e>(&self, expression: &'e str) -> Vec<&'e str> {
                expression
                    .split(['[', ']'])
                    .skip(1)
                    .step_by(2)
                    .collect()
            }
        }

        let defs = vec![stat("cpu"), math("total", "[cpu] + [mem]")];
        let batch = classify_batch(&defs);
        let errors = resolve_with(&batch, &Bracketed).unwrap_err();
        assert_eq!(
            errors,
            vec![QueryError::new("total", QueryErrorKind::UnknownReference("mem".to_string()))]
        );
    }
}
