//! # Blog Core
//!
//! The domain layer of the blog store.
//! Posts, query options, versioning snapshots and the ports that persistence
//! adapters implement. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod versioning;

pub use error::{DomainError, RepoError};
pub use versioning::Versioning;
