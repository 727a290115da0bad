//! Activity log adapters.

mod file;
mod in_memory;

pub use file::FileActivityLog;
pub use in_memory::InMemoryActivityLog;
