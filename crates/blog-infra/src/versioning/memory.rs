//! In-memory snapshot store - used in tests and when no database is wired.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blog_core::RepoError;
use blog_core::domain::{SortOrder, Version, VersionColumn, VersionQuery};
use blog_core::ports::VersionRepository;

/// Snapshots kept in insertion order behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryVersionRepository {
    store: RwLock<Vec<Version>>,
}

impl InMemoryVersionRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    fn matches(query: &VersionQuery, version: &Version) -> bool {
        query.id_filter().is_none_or(|id| version.id == id)
            && query
                .entity_type_filter()
                .is_none_or(|entity_type| version.entity_type == entity_type)
            && query
                .entity_id_filter()
                .is_none_or(|entity_id| version.entity_id == entity_id)
            && (query.with_deleted || !version.is_soft_deleted())
    }

    fn compare(column: VersionColumn, a: &Version, b: &Version) -> Ordering {
        match column {
            VersionColumn::Id => a.id.cmp(&b.id),
            VersionColumn::EntityType => a.entity_type.cmp(&b.entity_type),
            VersionColumn::EntityId => a.entity_id.cmp(&b.entity_id),
            VersionColumn::Content => a.content.cmp(&b.content),
            VersionColumn::CreatedAt => a
                .created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id)),
            VersionColumn::SoftDeletedAt => a.soft_deleted_at.cmp(&b.soft_deleted_at),
        }
    }
}

impl Default for InMemoryVersionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn create(&self, version: &Version) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|v| v.id == version.id) {
            return Err(RepoError::Query(format!(
                "version '{}' already exists",
                version.id
            )));
        }
        store.push(version.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Version>, RepoError> {
        let query = VersionQuery {
            id: Some(id.to_string()),
            ..Default::default()
        };
        let store = self.store.read().await;
        Ok(store.iter().find(|v| Self::matches(&query, v)).cloned())
    }

    async fn list(&self, query: VersionQuery) -> Result<Vec<Version>, RepoError> {
        let mut found: Vec<Version> = {
            let store = self.store.read().await;
            store
                .iter()
                .filter(|v| Self::matches(&query, v))
                .cloned()
                .collect()
        };

        if let Some(column) = query.order_by {
            found.sort_by(|a, b| match query.sort_order {
                SortOrder::Asc => Self::compare(column, a, b),
                SortOrder::Desc => Self::compare(column, b, a),
            });
        }

        let offset = query.offset_value().unwrap_or(0) as usize;
        let limit = query.limit_value().map_or(usize::MAX, |l| l as usize);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, version: &Version) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.iter_mut().find(|v| v.id == version.id) {
            *existing = version.clone();
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        self.store.write().await.retain(|v| v.id != id);
        Ok(())
    }

    async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.iter_mut().find(|v| v.id == id) {
            existing.soft_deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use blog_core::Versioning;
    use blog_core::domain::{Post, VersionedEntity};
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_latest_returns_newest_snapshot() {
        let repo = InMemoryVersionRepository::new();
        let mut first = Version::new("post", "p1", "one");
        first.created_at -= Duration::seconds(5);
        let second = Version::new("post", "p1", "two");
        let other = Version::new("post", "p2", "three");

        repo.create(&second).await.unwrap();
        repo.create(&first).await.unwrap();
        repo.create(&other).await.unwrap();

        let latest = repo.latest("post", "p1").await.unwrap().unwrap();
        assert_eq!(latest.content, "two");
        assert!(repo.latest("post", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_snapshots_are_hidden() {
        let repo = InMemoryVersionRepository::new();
        let version = Version::new("post", "p1", "one");
        repo.create(&version).await.unwrap();

        repo.soft_delete(&version).await.unwrap();

        assert!(repo.find_by_id(&version.id).await.unwrap().is_none());
        assert!(repo.latest("post", "p1").await.unwrap().is_none());

        let all = repo
            .list(VersionQuery {
                with_deleted: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_soft_deleted());
    }

    #[tokio::test]
    async fn test_pagination_and_delete() {
        let repo = InMemoryVersionRepository::new();
        for i in 0..5 {
            let mut version = Version::new("post", "p1", format!("v{i}"));
            version.created_at += Duration::seconds(i);
            repo.create(&version).await.unwrap();
        }

        let page = repo
            .list(
                VersionQuery::for_entity("post", "p1")
                    .with_order(VersionColumn::CreatedAt, SortOrder::Asc)
                    .with_limit(2),
            )
            .await
            .unwrap();
        assert_eq!(
            page.iter().map(|v| v.content.as_str()).collect::<Vec<_>>(),
            vec!["v0", "v1"]
        );

        repo.delete(&page[0]).await.unwrap();
        assert_eq!(repo.len().await, 4);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = InMemoryVersionRepository::new();
        let version = Version::new("post", "p1", "one");
        repo.create(&version).await.unwrap();

        assert!(matches!(
            repo.create(&version).await,
            Err(RepoError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_backs_versioning_engine() {
        let repo = Arc::new(InMemoryVersionRepository::new());
        let versioning = Versioning::enabled(repo.clone());

        let mut post = Post::new();
        post.set_title("Draft");
        assert!(versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert!(!versioning.track(VersionedEntity::from(&post)).await.unwrap());

        post.set_title("Final");
        assert!(versioning.track(VersionedEntity::from(&post)).await.unwrap());
        assert_eq!(repo.len().await, 2);
    }
}
