//! Console link construction

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::query::{Dimensions, QueryDefinition, WILDCARD};
use crate::request::{MetricExpression, MetricStatMeta, RequestParams};
use super::error::LinkError;

/// Chart settings supplied by the caller, shared by every link in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayContext {
    /// Console chart style
    pub view: String,
    pub stacked: bool,
    /// Range start, passed through verbatim (e.g. RFC 3339)
    pub start: String,
    pub end: String,
    /// Used when a query does not name its own region
    pub region: String,
}

impl Default for DisplayContext {
    fn default() -> Self {
        Self {
            view: "timeSeries".to_string(),
            stacked: false,
            start: String::new(),
            end: String::new(),
            region: "us-east-1".to_string(),
        }
    }
}

/// A console view reproducing one query
///
/// The field names are what the console's deep-link handler reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleLink {
    pub view: String,
    pub stacked: bool,
    pub title: String,
    pub start: String,
    pub end: String,
    pub region: String,
    /// One opaque descriptor per metric, mirroring the API request
    pub metrics: Vec<Value>,
}

/// Build the console link for a query whose request has already been built
///
/// The descriptor shape follows the mode the params were built for. Cannot
/// fail: the request builder has validated every field the link uses.
pub fn build_link(def: &QueryDefinition, params: &RequestParams, ctx: &DisplayContext) -> ConsoleLink {
    let metrics = match params {
        RequestParams::MetricStat(p) => {
            vec![metric_descriptor(&p.namespace, &p.metric_name, &p.dimensions, &p.meta)]
        }
        RequestParams::InferredSearchExpression(p) => vec![metric_descriptor(
            &p.namespace,
            p.metric_name.as_deref().unwrap_or_default(),
            &p.dimensions,
            &p.meta,
        )],
        RequestParams::MathExpression(e) | RequestParams::SqlExpression(e) => vec![expression_descriptor(e)],
    };
    debug!(ref_id = %def.ref_id, mode = %params.mode(), descriptors = metrics.len(), "built console link");

    ConsoleLink {
        view: ctx.view.clone(),
        stacked: ctx.stacked,
        title: def.label.clone().unwrap_or_else(|| def.ref_id.clone()),
        start: ctx.start.clone(),
        end: ctx.end.clone(),
        region: def.region.clone().unwrap_or_else(|| ctx.region.clone()),
        metrics,
    }
}

/// `[namespace, metricName, dimKey, dimValue, ..., {stat, period, label}]`
///
/// Dimensions are listed with their first concrete value; wildcard-only
/// dimensions are left out.
fn metric_descriptor(namespace: &str, metric_name: &str, dimensions: &Dimensions, meta: &MetricStatMeta) -> Value {
    let mut items = vec![Value::from(namespace), Value::from(metric_name)];
    for (key, values) in dimensions {
        if let Some(value) = values.iter().find(|v| *v != WILDCARD) {
            items.push(Value::from(key.as_str()));
            items.push(Value::from(value.as_str()));
        }
    }

    let mut options = Map::new();
    options.insert("stat".to_string(), Value::from(meta.stat.as_str()));
    options.insert("period".to_string(), Value::from(meta.period));
    if let Some(label) = &meta.label {
        options.insert("label".to_string(), Value::from(label.as_str()));
    }
    items.push(Value::Object(options));
    Value::Array(items)
}

/// `{expression, label}`
fn expression_descriptor(expression: &MetricExpression) -> Value {
    let mut descriptor = Map::new();
    descriptor.insert("expression".to_string(), Value::from(expression.expression.as_str()));
    if let Some(label) = &expression.label {
        descriptor.insert("label".to_string(), Value::from(label.as_str()));
    }
    Value::Object(descriptor)
}

/// Region codes such as `eu-west-1` or `us-gov-east-1`
fn region_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region regex must compile"))
}

/// Console domain for a region's partition
fn console_domain(region: &str) -> &'static str {
    if region.starts_with("us-gov-") {
        "amazonaws-us-gov.com"
    } else if region.starts_with("cn-") {
        "amazonaws.cn"
    } else {
        "aws.amazon.com"
    }
}

impl ConsoleLink {
    /// Render the deep link URL
    ///
    /// `https://<region>.console.<domain>/cloudwatch/deeplink.js?region=<region>#metricsV2:graph=<link JSON>`
    pub fn to_url(&self) -> Result<Url, LinkError> {
        if !region_regex().is_match(&self.region) {
            return Err(LinkError::InvalidRegion(self.region.clone()));
        }
        let graph = serde_json::to_string(self)?;
        let mut url = Url::parse(&format!(
            "https://{}.console.{}/cloudwatch/deeplink.js",
            self.region,
            console_domain(&self.region)
        ))?;
        url.query_pairs_mut().append_pair("region", &self.region);

        let fragment = form_urlencoded::Serializer::new(String::new())
            .append_pair("graph", &graph)
            .finish();
        url.set_fragment(Some(&format!("metricsV2:{}", fragment)));
        Ok(url)
    }
}
