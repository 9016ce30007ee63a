pub mod error;
pub mod field;
pub mod filter;
pub mod query;
pub mod record;

// Re-export commonly used types
pub use error::CoreError;
pub use field::{FilterField, TableName};
pub use filter::FilterSelection;
pub use query::{build, build_raw, categories_sql, flows_sql, Predicate};
pub use record::{CategoryRecord, FlowRecord};
