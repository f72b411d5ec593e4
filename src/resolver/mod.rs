//! Dependency resolver (verb module)
//!
//! Classified batch → evaluation order, or per-query reference errors

mod recognizer;
mod resolve;
mod types;

pub use recognizer::{MathReferenceRecognizer, ReferenceRecognizer, METRIC_MATH_KEYWORDS};
pub use resolve::{resolve_against, resolve_dependencies, resolve_partial, resolve_with};
pub use types::{EvaluationOrder, Resolution};
