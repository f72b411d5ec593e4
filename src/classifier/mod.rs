//! Mode classifier (verb module)
//!
//! QueryDefinition → ApiMode

mod rules;
mod mode;

pub use rules::{classify, classify_batch, Classified};
pub use mode::ApiMode;
