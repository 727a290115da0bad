//! Position oracle adapters.

mod http;
mod in_memory;

pub use http::HttpPositionOracle;
pub use in_memory::InMemoryPositionOracle;
