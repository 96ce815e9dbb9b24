//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//! This crate contains the SQL post store, the snapshot stores and the
//! configuration needed to reach a database.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory snapshot store only
//! - `sql` - SQL post and snapshot stores via SeaORM

pub mod database;
pub mod versioning;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, StoreOptions};
pub use versioning::InMemoryVersionRepository;

// Re-exports - SQL
#[cfg(feature = "sql")]
pub use database::{SqlPostRepository, SqlVersionRepository};
