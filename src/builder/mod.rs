//! Request builder (verb module)
//!
//! QueryDefinition + ApiMode → RequestParams

mod params;
mod search;

pub use params::{build, build_request, DEFAULT_SEARCH_PERIOD, DEFAULT_SEARCH_STATISTIC};
pub use search::{build_search_expression, SearchCriteria};
