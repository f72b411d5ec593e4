//! Batch pipeline
//!
//! Raw queries → validated definitions → modes → evaluation order → requests
//! (and console links). Every per-query failure is collected and attributed to
//! its refId; only a malformed batch (missing or duplicate refIds) is
//! rejected as a whole.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::builder::build_request;
use crate::classifier::{classify_batch, ApiMode};
use crate::link::{build_link, ConsoleLink, DisplayContext};
use crate::query::{BatchError, QueryDefinition, QueryError, QueryErrorKind, RawQuery};
use crate::request::MetricDataRequest;
use crate::resolver::{resolve_against, EvaluationOrder, MathReferenceRecognizer, ReferenceRecognizer};

/// A query that is ready to be sent to the metrics API
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub request: MetricDataRequest,
    /// Present when the caller supplied a display context
    pub link: Option<ConsoleLink>,
}

impl PreparedQuery {
    pub fn ref_id(&self) -> &str {
        &self.request.ref_id
    }

    pub fn mode(&self) -> ApiMode {
        self.request.mode()
    }
}

/// Result of preparing a batch
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully built queries, in evaluation order
    pub queries: Vec<PreparedQuery>,
    /// Evaluation order of the prepared queries
    pub order: EvaluationOrder,
    /// Per-query failures, in batch order
    pub errors: Vec<QueryError>,
}

impl BatchOutcome {
    pub fn get(&self, ref_id: &str) -> Option<&PreparedQuery> {
        self.queries.iter().find(|q| q.ref_id() == ref_id)
    }

    /// Errors attributed to one query
    pub fn errors_for<'a>(&'a self, ref_id: &'a str) -> impl Iterator<Item = &'a QueryError> + 'a {
        self.errors.iter().filter(move |e| e.ref_id == ref_id)
    }

    /// True when every query in the batch was prepared
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reject batches that are empty or whose refIds are missing or repeated
pub fn validate_ref_ids<'a, I>(ref_ids: I) -> Result<(), BatchError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut count = 0;
    for (index, ref_id) in ref_ids.into_iter().enumerate() {
        count += 1;
        if ref_id.is_empty() {
            return Err(BatchError::MissingRefId { index });
        }
        if !seen.insert(ref_id) {
            return Err(BatchError::DuplicateRefId(ref_id.to_string()));
        }
    }
    if count == 0 {
        return Err(BatchError::EmptyBatch);
    }
    Ok(())
}

/// Prepare a batch of raw editor queries
///
/// A query that fails validation takes no further part in the batch, and
/// expressions referring to it fail with `DependencyFailed`.
pub fn prepare_batch(raw: Vec<RawQuery>, ctx: Option<&DisplayContext>) -> Result<BatchOutcome, BatchError> {
    validate_ref_ids(raw.iter().map(|q| q.ref_id.as_str()))?;

    let positions: HashMap<String, usize> = raw
        .iter()
        .enumerate()
        .map(|(i, q)| (q.ref_id.clone(), i))
        .collect();

    let mut defs = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for query in raw {
        match QueryDefinition::from_raw(query) {
            Ok(def) => defs.push(def),
            Err(err) => invalid.push(err),
        }
    }
    for err in &invalid {
        warn!(ref_id = %err.ref_id, error = %err.kind, "query rejected");
    }

    let unavailable: HashSet<&str> = invalid.iter().map(|e| e.ref_id.as_str()).collect();
    let mut outcome = prepare_with_unavailable(&defs, &unavailable, ctx, &MathReferenceRecognizer);
    outcome.errors.extend(invalid);
    outcome
        .errors
        .sort_by_key(|e| positions.get(&e.ref_id).copied().unwrap_or(usize::MAX));
    Ok(outcome)
}

/// Prepare a batch of validated definitions with the default recognizer
pub fn prepare_definitions(defs: &[QueryDefinition], ctx: Option<&DisplayContext>) -> Result<BatchOutcome, BatchError> {
    prepare_definitions_with(defs, ctx, &MathReferenceRecognizer)
}

/// Prepare a batch of validated definitions
///
/// # Arguments
/// * `defs` - The complete batch
/// * `ctx` - Display settings; links are only built when present
/// * `recognizer` - Finds refId references in math expressions
pub fn prepare_definitions_with<R>(
    defs: &[QueryDefinition],
    ctx: Option<&DisplayContext>,
    recognizer: &R,
) -> Result<BatchOutcome, BatchError>
where
    R: ReferenceRecognizer + ?Sized,
{
    validate_ref_ids(defs.iter().map(|d| d.ref_id.as_str()))?;
    Ok(prepare_with_unavailable(defs, &HashSet::new(), ctx, recognizer))
}

fn prepare_with_unavailable<R>(
    defs: &[QueryDefinition],
    unavailable: &HashSet<&str>,
    ctx: Option<&DisplayContext>,
    recognizer: &R,
) -> BatchOutcome
where
    R: ReferenceRecognizer + ?Sized,
{
    // 1. Classify
    let classified = classify_batch(defs);

    // 2. Resolve expression references over the whole batch
    let resolution = resolve_against(&classified, unavailable, recognizer);
    let mut errors = resolution.errors;
    let mut failed: HashSet<String> = errors.iter().map(|e| e.ref_id.clone()).collect();

    // 3. Build requests (and links) in evaluation order; a build failure
    //    fails every query that depends on it
    let by_ref_id: HashMap<&str, usize> = classified
        .iter()
        .enumerate()
        .map(|(i, c)| (c.query.ref_id.as_str(), i))
        .collect();

    let mut queries = Vec::with_capacity(resolution.order.len());
    for ref_id in resolution.order.iter() {
        let Some(&i) = by_ref_id.get(ref_id) else {
            continue;
        };
        let item = &classified[i];

        let failed_dependency = resolution
            .dependencies
            .get(ref_id)
            .and_then(|deps| deps.iter().find(|d| failed.contains(d.as_str())));
        if let Some(dependency) = failed_dependency {
            errors.push(QueryError::new(ref_id, QueryErrorKind::DependencyFailed(dependency.clone())));
            failed.insert(ref_id.to_string());
            continue;
        }

        match build_request(item) {
            Ok(request) => {
                let link = ctx.map(|ctx| build_link(item.query, &request.params, ctx));
                queries.push(PreparedQuery { request, link });
            }
            Err(err) => {
                failed.insert(ref_id.to_string());
                errors.push(err);
            }
        }
    }

    for err in &errors {
        warn!(ref_id = %err.ref_id, error = %err.kind, "query failed");
    }
    errors.sort_by_key(|e| by_ref_id.get(e.ref_id.as_str()).copied().unwrap_or(usize::MAX));

    info!(
        queries = defs.len(),
        prepared = queries.len(),
        failed = errors.len(),
        "prepared query batch"
    );

    let order = EvaluationOrder(queries.iter().map(|q| q.ref_id().to_string()).collect());
    BatchOutcome { queries, order, errors }
}
