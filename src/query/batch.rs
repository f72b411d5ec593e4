use serde::Deserialize;

use crate::link::DisplayContext;
use super::raw::RawQuery;

/// A batch file: display settings plus the queries of one panel request
///
/// ```yaml
/// context:
///   region: eu-west-1
///   start: "2024-05-01T00:00:00Z"
///   end: "2024-05-01T06:00:00Z"
/// queries:
///   - refId: A
///     queryType: query
///     namespace: AWS/EC2
///     metricName: CPUUtilization
///     statistic: Average
///     period: 300
///   - refId: B
///     expression: A*100
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryBatch {
    #[serde(default)]
    pub context: Option<DisplayContext>,
    #[serde(default)]
    pub queries: Vec<RawQuery>,
}
