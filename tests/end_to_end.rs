//! Integration tests for the full batch pipeline
//!
//! Batch file → classification → dependency resolution → requests and links.

mod common;

use common::{load_fixture, run_pipeline};
use cwquery::{prepare_batch, ApiMode, BatchError, RawQuery, RequestParams};
use serde_json::json;

#[test]
fn test_stat_and_math_expression() {
    let outcome = run_pipeline("ec2_cpu.yaml");

    assert!(outcome.is_complete(), "unexpected errors: {:?}", outcome.errors);
    assert_eq!(outcome.order.0, vec!["A", "B"]);

    // A is a plain statistic lookup
    let a = outcome.get("A").expect("A should be prepared");
    assert_eq!(a.mode(), ApiMode::MetricStat);
    let RequestParams::MetricStat(stat) = &a.request.params else {
        panic!("A should build metric stat params");
    };
    assert_eq!(stat.namespace, "AWS/EC2");
    assert_eq!(stat.metric_name, "CPUUtilization");
    assert_eq!(stat.meta.stat, "Average");
    assert_eq!(stat.meta.period, 300);

    // B is a math expression over A
    let b = outcome.get("B").expect("B should be prepared");
    assert_eq!(b.mode(), ApiMode::MathExpression);
    let expression = b.request.params.metric_expression().unwrap();
    assert_eq!(expression.expression, "A*100");
    assert_eq!(expression.label.as_deref(), Some("CPU percent"));
}

#[test]
fn test_request_wire_format() {
    let outcome = run_pipeline("ec2_cpu.yaml");
    let requests: Vec<_> = outcome.queries.iter().map(|q| &q.request).collect();

    assert_eq!(
        serde_json::to_value(&requests).unwrap(),
        json!([
            {
                "refId": "A",
                "mode": "MetricStat",
                "namespace": "AWS/EC2",
                "metricName": "CPUUtilization",
                "dimensions": {"InstanceId": ["i-0abc123"]},
                "meta": {"stat": "Average", "period": 300}
            },
            {
                "refId": "B",
                "mode": "MathExpression",
                "expression": "A*100",
                "label": "CPU percent"
            }
        ])
    );
}

#[test]
fn test_link_matches_request() {
    let outcome = run_pipeline("ec2_cpu.yaml");
    let a = outcome.get("A").unwrap();
    let link = a.link.as_ref().expect("context was supplied");
    let RequestParams::MetricStat(stat) = &a.request.params else {
        panic!("A should build metric stat params");
    };

    assert_eq!(link.metrics.len(), 1);
    let descriptor = link.metrics[0].as_array().unwrap();
    assert_eq!(descriptor[0], json!(stat.namespace));
    assert_eq!(descriptor[1], json!(stat.metric_name));
    let meta = descriptor.last().unwrap();
    assert_eq!(meta["stat"], json!(stat.meta.stat));
    assert_eq!(meta["period"], json!(stat.meta.period));

    assert_eq!(link.start, "2024-05-01T00:00:00Z");
    assert_eq!(link.end, "2024-05-01T06:00:00Z");
    assert_eq!(link.region, "us-east-1");
}

#[test]
fn test_mixed_modes() {
    let outcome = run_pipeline("mixed_modes.yaml");
    assert!(outcome.is_complete(), "unexpected errors: {:?}", outcome.errors);

    let modes: Vec<(&str, ApiMode)> = outcome.queries.iter().map(|q| (q.ref_id(), q.mode())).collect();
    assert_eq!(
        modes,
        vec![
            ("stat", ApiMode::MetricStat),
            ("search", ApiMode::InferredSearchExpression),
            ("ratio", ApiMode::MathExpression),
            ("sql", ApiMode::SqlExpression),
        ]
    );

    let RequestParams::InferredSearchExpression(search) = &outcome.get("search").unwrap().request.params else {
        panic!("search should build search params");
    };
    assert_eq!(
        search.expression,
        r#"REMOVE_EMPTY(SEARCH('Namespace="AWS/Lambda" MetricName="Invocations" "FunctionName"', 'Sum', 60))"#
    );

    let sql = outcome.get("sql").unwrap();
    let link = sql.link.as_ref().unwrap();
    assert_eq!(link.region, "us-gov-west-1");
    assert!(link.stacked);
    let url = link.to_url().unwrap();
    assert_eq!(url.host_str(), Some("us-gov-west-1.console.amazonaws-us-gov.com"));
}

#[test]
fn test_one_failure_does_not_block_others() {
    let mut batch = load_fixture("ec2_cpu.yaml");
    batch.queries.push(RawQuery {
        ref_id: "C".to_string(),
        query_type: Some(json!("query")),
        namespace: Some("AWS/EC2".to_string()),
        ..Default::default()
    });

    let outcome = prepare_batch(batch.queries, None).unwrap();
    assert_eq!(outcome.queries.len(), 2);
    let errors: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        errors,
        vec!["error parsing query \"C\", missing required field 'metricName'".to_string()]
    );
}

#[test]
fn test_batch_without_ref_id_is_rejected() {
    let mut batch = load_fixture("ec2_cpu.yaml");
    batch.queries[1].ref_id.clear();
    let result = prepare_batch(batch.queries, None);
    assert_eq!(result.unwrap_err(), BatchError::MissingRefId { index: 1 });
}

#[test]
fn test_results_are_reproducible() {
    let first = run_pipeline("broken_references.yaml");
    let second = run_pipeline("broken_references.yaml");
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.order, second.order);
}
