use async_trait::async_trait;

use crate::domain::{Post, PostQueryOptions, Version, VersionQuery};
use crate::error::RepoError;
use crate::versioning::Versioning;

/// Post persistence.
///
/// Listing operations hide soft-deleted rows unless the options opt into
/// `with_deleted`. Single-row lookups return `Ok(None)` when nothing matches.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Stamp `created_at`/`updated_at`, insert every column, then snapshot.
    async fn create(&self, post: &mut Post) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError>;

    async fn list(&self, options: PostQueryOptions) -> Result<Vec<Post>, RepoError>;

    async fn count(&self, options: PostQueryOptions) -> Result<i64, RepoError>;

    /// Persist exactly the changed columns. `updated_at` is left to the caller.
    async fn update(&self, post: &mut Post) -> Result<(), RepoError>;

    async fn soft_delete(&self, post: &mut Post) -> Result<(), RepoError>;

    async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError>;

    /// Move the post to the trash status. Independent of soft deletion.
    async fn trash(&self, post: &mut Post) -> Result<(), RepoError>;

    async fn delete(&self, post: &Post) -> Result<(), RepoError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), RepoError>;

    /// Nearest post created strictly before the given one.
    async fn find_previous(&self, post: &Post) -> Result<Option<Post>, RepoError>;

    /// Nearest post created strictly after the given one.
    async fn find_next(&self, post: &Post) -> Result<Option<Post>, RepoError>;

    /// Snapshot history attached to this repository.
    fn versioning(&self) -> &Versioning;

    fn versioning_enabled(&self) -> bool {
        self.versioning().is_enabled()
    }
}

/// Snapshot persistence backing the versioning engine.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    async fn create(&self, version: &Version) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Version>, RepoError>;

    async fn list(&self, query: VersionQuery) -> Result<Vec<Version>, RepoError>;

    async fn update(&self, version: &Version) -> Result<(), RepoError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), RepoError>;

    async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError>;

    async fn delete(&self, version: &Version) -> Result<(), RepoError> {
        self.delete_by_id(&version.id).await
    }

    async fn soft_delete(&self, version: &Version) -> Result<(), RepoError> {
        self.soft_delete_by_id(&version.id).await
    }

    /// Most recent visible snapshot of one entity.
    async fn latest(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<Version>, RepoError> {
        let mut found = self
            .list(VersionQuery::for_entity(entity_type, entity_id).with_limit(1))
            .await?;
        Ok(found.pop())
    }
}
