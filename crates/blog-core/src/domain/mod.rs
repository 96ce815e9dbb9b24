//! Domain entities - the core business objects.

pub mod datetime;

mod post;
mod query;
mod version;

pub use post::{Changeset, ContentType, Featured, Post, PostColumn, PostStatus};
pub use query::{PostQueryOptions, SortOrder};
pub use version::{EntityType, Version, VersionColumn, VersionQuery, VersionedEntity};
