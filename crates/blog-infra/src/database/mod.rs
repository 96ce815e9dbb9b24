//! SQL persistence: connections, store options, query building and the
//! post and snapshot repositories.

mod connections;
mod options;

#[cfg(feature = "sql")]
pub mod entity;
#[cfg(feature = "sql")]
mod post_repo;
#[cfg(feature = "sql")]
pub mod query_builder;
#[cfg(feature = "sql")]
pub mod schema;
#[cfg(feature = "sql")]
mod sql_base;
#[cfg(feature = "sql")]
mod version_repo;

pub use connections::DatabaseConfig;
pub use options::{DEFAULT_POST_TABLE, DEFAULT_VERSIONING_TABLE, StoreOptions};

#[cfg(feature = "sql")]
pub use post_repo::SqlPostRepository;
#[cfg(feature = "sql")]
pub use version_repo::SqlVersionRepository;
