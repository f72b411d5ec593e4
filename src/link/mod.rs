//! Console links (noun module)
//!
//! Deep links reproducing a query's chart in the metrics console, built from
//! the same request parameters that are sent to the API.

mod console;
mod error;

pub use console::{build_link, ConsoleLink, DisplayContext};
pub use error::LinkError;
