//! Versioning engine - change-detecting snapshots of entity content.
//!
//! A snapshot is written only when the entity's canonical content differs
//! byte-for-byte from the most recent snapshot of the same entity. When
//! versioning is disabled every call succeeds without touching storage.

use std::fmt;
use std::sync::Arc;

use crate::domain::{Version, VersionQuery, VersionedEntity};
use crate::error::RepoError;
use crate::ports::VersionRepository;

#[derive(Clone, Default)]
pub struct Versioning {
    enabled: bool,
    repository: Option<Arc<dyn VersionRepository>>,
}

impl fmt::Debug for Versioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Versioning")
            .field("enabled", &self.enabled)
            .field("has_repository", &self.repository.is_some())
            .finish()
    }
}

impl Versioning {
    /// Versioning switched off: tracking is a silent no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(repository: Arc<dyn VersionRepository>) -> Self {
        Self {
            enabled: true,
            repository: Some(repository),
        }
    }

    /// Raw constructor. Enabled without a repository is accepted here and
    /// reported as a configuration error by each operation.
    pub fn from_parts(enabled: bool, repository: Option<Arc<dyn VersionRepository>>) -> Self {
        Self {
            enabled,
            repository,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn repository(&self) -> Result<Option<&dyn VersionRepository>, RepoError> {
        if !self.enabled {
            return Ok(None);
        }
        self.repository
            .as_deref()
            .map(Some)
            .ok_or_else(|| {
                RepoError::Configuration("versioning is enabled but no store is configured".into())
            })
    }

    /// Snapshot an entity if its content changed. Returns whether a snapshot
    /// was written.
    pub async fn track(&self, entity: VersionedEntity<'_>) -> Result<bool, RepoError> {
        if !self.enabled {
            return Ok(false);
        }
        let content = entity.content()?;
        self.track_if_changed(entity.entity_type().as_str(), entity.entity_id(), &content)
            .await
    }

    pub async fn track_if_changed(
        &self,
        entity_type: &str,
        entity_id: &str,
        content: &str,
    ) -> Result<bool, RepoError> {
        let Some(repository) = self.repository()? else {
            return Ok(false);
        };
        require("entity type", entity_type)?;
        require("entity id", entity_id)?;

        if let Some(latest) = repository.latest(entity_type, entity_id).await? {
            if latest.content == content {
                tracing::debug!(entity_type, entity_id, "Content unchanged, snapshot skipped");
                return Ok(false);
            }
        }

        let version = Version::new(entity_type, entity_id, content);
        repository.create(&version).await?;
        tracing::debug!(
            entity_type,
            entity_id,
            version_id = %version.id,
            "Snapshot created"
        );
        Ok(true)
    }

    pub async fn create(&self, version: &Version) -> Result<(), RepoError> {
        match self.repository()? {
            Some(repository) => repository.create(version).await,
            None => Ok(()),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Version>, RepoError> {
        let Some(repository) = self.repository()? else {
            return Ok(None);
        };
        require("version id", id)?;
        repository.find_by_id(id).await
    }

    pub async fn list(&self, query: VersionQuery) -> Result<Vec<Version>, RepoError> {
        match self.repository()? {
            Some(repository) => repository.list(query).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn update(&self, version: &Version) -> Result<(), RepoError> {
        let Some(repository) = self.repository()? else {
            return Ok(());
        };
        require("version id", &version.id)?;
        repository.update(version).await
    }

    pub async fn delete(&self, version: &Version) -> Result<(), RepoError> {
        self.delete_by_id(&version.id).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        let Some(repository) = self.repository()? else {
            return Ok(());
        };
        require("version id", id)?;
        repository.delete_by_id(id).await
    }

    pub async fn soft_delete(&self, version: &Version) -> Result<(), RepoError> {
        self.soft_delete_by_id(&version.id).await
    }

    pub async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        let Some(repository) = self.repository()? else {
            return Ok(());
        };
        require("version id", id)?;
        repository.soft_delete_by_id(id).await
    }
}

fn require(what: &str, value: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::Precondition(format!("{what} is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{EntityType, Post};

    #[derive(Default)]
    struct FakeVersionRepository {
        versions: Mutex<Vec<Version>>,
        lookups: Mutex<usize>,
    }

    impl FakeVersionRepository {
        fn count(&self) -> usize {
            self.versions.lock().unwrap().len()
        }

        fn lookups(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    #[async_trait]
    impl VersionRepository for FakeVersionRepository {
        async fn create(&self, version: &Version) -> Result<(), RepoError> {
            self.versions.lock().unwrap().push(version.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Version>, RepoError> {
            Ok(self
                .versions
                .lock()
                .unwrap()
                .iter()
                .find(|v| v.id == id)
                .cloned())
        }

        async fn list(&self, query: VersionQuery) -> Result<Vec<Version>, RepoError> {
            *self.lookups.lock().unwrap() += 1;
            let mut found: Vec<Version> = self
                .versions
                .lock()
                .unwrap()
                .iter()
                .filter(|v| query.entity_id_filter().is_none_or(|id| v.entity_id == id))
                .cloned()
                .collect();
            found.reverse();
            if let Some(limit) = query.limit_value() {
                found.truncate(limit as usize);
            }
            Ok(found)
        }

        async fn update(&self, _version: &Version) -> Result<(), RepoError> {
            Ok(())
        }

        async fn delete_by_id(&self, id: &str) -> Result<(), RepoError> {
            self.versions.lock().unwrap().retain(|v| v.id != id);
            Ok(())
        }

        async fn soft_delete_by_id(&self, _id: &str) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_disabled_versioning_is_noop() {
        let versioning = Versioning::disabled();
        let post = Post::new();

        assert!(!versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert!(!versioning.track_if_changed("", "", "{}").await.unwrap());
        assert!(versioning.list(VersionQuery::default()).await.unwrap().is_empty());
        assert!(versioning.find_by_id("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enabled_without_store_is_configuration_error() {
        let versioning = Versioning::from_parts(true, None);
        let post = Post::new();

        let err = versioning.track(VersionedEntity::from(&post)).await.unwrap_err();
        assert!(matches!(err, RepoError::Configuration(_)));
        assert!(matches!(
            versioning.list(VersionQuery::default()).await,
            Err(RepoError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_identifiers_fail_before_io() {
        let repo = Arc::new(FakeVersionRepository::default());
        let versioning = Versioning::enabled(repo.clone());

        let err = versioning.track_if_changed("post", " ", "{}").await.unwrap_err();
        assert!(matches!(err, RepoError::Precondition(_)));
        let err = versioning.track_if_changed("", "id", "{}").await.unwrap_err();
        assert!(matches!(err, RepoError::Precondition(_)));
        assert_eq!(repo.lookups(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_content_is_deduplicated() {
        let repo = Arc::new(FakeVersionRepository::default());
        let versioning = Versioning::enabled(repo.clone());

        let mut post = Post::new();
        post.set_title("A");

        assert!(versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert!(!versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert_eq!(repo.count(), 1);

        post.set_title("B");
        assert!(versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert_eq!(repo.count(), 2);

        // Reverting to earlier content still differs from the latest snapshot.
        post.set_title("A");
        assert!(versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert_eq!(repo.count(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_carries_entity_reference() {
        let repo = Arc::new(FakeVersionRepository::default());
        let versioning = Versioning::enabled(repo.clone());
        let post = Post::new();

        versioning.track(VersionedEntity::from(&post)).await.unwrap();

        let history = versioning
            .list(VersionQuery::for_entity(EntityType::Post.as_str(), post.id()))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entity_type, "post");
        assert_eq!(history[0].entity_id, post.id());
        assert_eq!(history[0].content, post.versioned_content().unwrap());
    }
}
