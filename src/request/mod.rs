//! Request types (noun module)
//!
//! Parameters ready for submission to the metrics API.

mod types;

pub use types::{MetricDataRequest, MetricExpression, MetricStatMeta, MetricStatParams, RequestParams, SearchParams};
