//! Search orchestration: concurrent fan-out, dedup, truncation.
//!
//! [`search::fan_out`] routes a query, calls the selected adapters in
//! parallel and merges what they return. Caching lives one layer up.

pub mod dedup;
pub mod search;
pub mod url_normalize;

pub use search::{dispatch, fan_out, merge, AdapterSet, FanOut, ProviderOutcome};
