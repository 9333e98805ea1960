//! Application use cases (business logic orchestration).

mod fetch_baseline;
mod student_records;

pub use fetch_baseline::*;
pub use student_records::*;
