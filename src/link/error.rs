//! Console link errors

use std::fmt;

/// Errors that can occur while rendering a console link as a URL
#[derive(Debug)]
pub enum LinkError {
    /// Link could not be serialized to JSON
    Serialize {
        source: serde_json::Error,
    },
    /// Region is not a region code, so it cannot name a console host
    InvalidRegion(String),
    /// Region does not form a valid console URL
    Url {
        source: url::ParseError,
    },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Serialize { source } => {
                write!(f, "Failed to serialize console link: {}", source)
            }
            LinkError::InvalidRegion(region) => {
                write!(f, "Invalid region '{}' for a console link", region)
            }
            LinkError::Url { source } => {
                write!(f, "Invalid console URL: {}", source)
            }
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkError::Serialize { source } => Some(source),
            LinkError::InvalidRegion(_) => None,
            LinkError::Url { source } => Some(source),
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Serialize { source: err }
    }
}

impl From<url::ParseError> for LinkError {
    fn from(err: url::ParseError) -> Self {
        LinkError::Url { source: err }
    }
}
