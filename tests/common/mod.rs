//! Shared test utilities for integration tests

use cwquery::{parser, prepare_batch, BatchOutcome, QueryBatch};

/// Load a batch fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> QueryBatch {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Run the full pipeline on a fixture, building links with its context
pub fn run_pipeline(name: &str) -> BatchOutcome {
    let batch = load_fixture(name);
    prepare_batch(batch.queries, batch.context.as_ref())
        .unwrap_or_else(|e| panic!("Batch {} was rejected: {}", name, e))
}

/// RefIds of the failed queries, in batch order
#[allow(dead_code)]
pub fn failed_ref_ids(outcome: &BatchOutcome) -> Vec<&str> {
    outcome.errors.iter().map(|e| e.ref_id.as_str()).collect()
}
