//! Batch parser (verb module)
//!
//! Transforms YAML batch files and wire JSON into raw queries.

use std::path::Path;

use crate::error::ParseError;
use crate::query::{QueryBatch, RawQuery};

/// Parse a query batch from a YAML (or JSON) file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<QueryBatch, ParseError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })?;
    parse_str(&contents)
}

/// Parse a query batch from a YAML string
pub fn parse_str(yaml: &str) -> Result<QueryBatch, ParseError> {
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}

/// Parse the JSON array of queries sent by the editor
pub fn parse_queries_json(json: &str) -> Result<Vec<RawQuery>, ParseError> {
    serde_json::from_str(json).map_err(ParseError::from)
}
