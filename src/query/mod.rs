//! Query types (noun module)
//!
//! Raw editor queries, validated query definitions and per-query errors.

mod batch;
mod definition;
mod error;
mod raw;

pub use batch::QueryBatch;
pub use definition::{Dimensions, MetricEditorMode, MetricQueryType, QueryDefinition, WILDCARD};
pub use error::{BatchError, QueryError, QueryErrorKind};
pub use raw::{DimensionValues, RawQuery};
