//! Reference recognition inside expression text

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Finds the query identifiers an expression refers to
///
/// The resolver only needs to know which identifiers an expression uses,
/// not how to evaluate it, so the expression grammar lives behind this trait.
pub trait ReferenceRecognizer {
    /// Identifiers referenced by `expression`, each reported once, in order
    /// of first appearance
    fn references<'e>(&self, expression: &'e str) -> Vec<&'e str>;
}

/// Recognizer for metric math expressions such as `SUM([m1, m2]) / A * 100`
///
/// Quoted strings and numeric literals are skipped, identifiers directly
/// followed by `(` are function names, and [`METRIC_MATH_KEYWORDS`] are
/// language words. Every other identifier is a reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathReferenceRecognizer;

/// Bare words of the metric math language that never name a query
///
/// Fill modes (`FILL(m1, REPEAT)`), logical operators, and the statistic and
/// direction arguments of `SORT(METRICS(), AVG, DESC)`.
pub const METRIC_MATH_KEYWORDS: &[&str] = &[
    "REPEAT", "LINEAR", "AND", "OR", "NOT", "AVG", "MAX", "MIN", "SUM", "STDDEV", "ASC", "DESC",
];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|\d+(?:\.\d*)?(?:[eE][+-]?\d+)?|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)(?P<call>\s*\()?"#,
        )
        .expect("math token regex must compile")
    })
}

impl ReferenceRecognizer for MathReferenceRecognizer {
    fn references<'e>(&self, expression: &'e str) -> Vec<&'e str> {
        let mut seen = HashSet::new();
        token_regex()
            .captures_iter(expression)
            .filter(|caps| caps.name("call").is_none())
            .filter_map(|caps| caps.name("ident"))
            .map(|m| m.as_str())
            .filter(|ident| !METRIC_MATH_KEYWORDS.contains(ident))
            .filter(|ident| seen.insert(*ident))
            .collect()
    }
}
