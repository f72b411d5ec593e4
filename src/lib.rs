//! cwquery - Classify metric queries and build metrics API requests
//!
//! This library provides:
//! - Query definition types and validation of raw editor queries
//! - Batch parsing from YAML files and wire JSON
//! - Mode classification (metric stat, inferred search, math, SQL)
//! - Dependency resolution between math expressions
//! - Request parameter building
//! - Console deep-link construction
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `query/` - raw queries, query definitions, per-query errors
//! - `request/` - request payloads (MetricStatMeta, MetricExpression, RequestParams)
//! - `link/` - console links and display context
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML/JSON → QueryBatch
//! - `classifier/` - QueryDefinition → ApiMode
//! - `resolver/` - classified batch → evaluation order
//! - `builder/` - QueryDefinition + ApiMode → RequestParams
//! - `pipeline` - the above, per batch, with per-query error collection
//!
//! # Example
//!
//! ```ignore
//! use cwquery::{parser, prepare_batch};
//!
//! let batch = parser::parse_file("batch.yaml")?;
//! let outcome = prepare_batch(batch.queries, batch.context.as_ref())?;
//! for query in &outcome.queries {
//!     println!("{} → {}", query.ref_id(), query.mode());
//! }
//! for err in &outcome.errors {
//!     eprintln!("{}", err);
//! }
//! ```

pub mod query;
pub mod request;
pub mod link;
pub mod parser;
pub mod classifier;
pub mod resolver;
pub mod builder;
pub mod pipeline;
pub mod error;

// Re-export commonly used types
pub use query::{QueryDefinition, RawQuery, QueryBatch, MetricQueryType, MetricEditorMode, Dimensions, QueryError, QueryErrorKind, BatchError};
pub use request::{MetricDataRequest, RequestParams, MetricStatMeta, MetricExpression};
pub use link::{build_link, ConsoleLink, DisplayContext, LinkError};
pub use classifier::{classify, classify_batch, ApiMode, Classified};
pub use resolver::{resolve_dependencies, resolve_with, EvaluationOrder, ReferenceRecognizer, MathReferenceRecognizer};
pub use builder::{build, build_request};
pub use pipeline::{prepare_batch, prepare_definitions, BatchOutcome, PreparedQuery};
pub use error::ParseError;
