//! Warehouse access for the flowgate gateway.
//!
//! Provides the [`Warehouse`] trait defining the read contract the gateway
//! runs against, plus the [`SqliteWarehouse`] and [`InMemoryWarehouse`]
//! backends.
//!
//! # Modules
//!
//! - [`error`]: WarehouseError enum with all failure modes
//! - [`config`]: WarehouseConfig connection settings
//! - [`row`]: FlowRow, the full table row used for seeding and in-process evaluation
//! - [`traits`]: Warehouse trait definition
//! - [`schema`]: demo schema migrations and connection setup
//! - [`sqlite`]: SqliteWarehouse implementation
//! - [`memory`]: InMemoryWarehouse implementation

pub mod config;
pub mod error;
pub mod memory;
pub mod row;
pub mod schema;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use config::WarehouseConfig;
pub use error::WarehouseError;
pub use memory::InMemoryWarehouse;
pub use row::FlowRow;
pub use sqlite::SqliteWarehouse;
pub use traits::Warehouse;
