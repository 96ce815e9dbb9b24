//! Versioning snapshots - immutable, timestamped copies of entity content.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::Post;
use super::query::{SortOrder, non_blank, positive};
use crate::error::DomainError;

/// Entity kinds that carry a version history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Post,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Post => "post",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of versionable entities, borrowed for snapshotting.
#[derive(Debug, Clone, Copy)]
pub enum VersionedEntity<'a> {
    Post(&'a Post),
}

impl VersionedEntity<'_> {
    pub fn entity_type(&self) -> EntityType {
        match self {
            VersionedEntity::Post(_) => EntityType::Post,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            VersionedEntity::Post(post) => post.id(),
        }
    }

    /// Canonical content fingerprint stored in the snapshot.
    pub fn content(&self) -> Result<String, DomainError> {
        match self {
            VersionedEntity::Post(post) => post.versioned_content(),
        }
    }
}

impl<'a> From<&'a Post> for VersionedEntity<'a> {
    fn from(post: &'a Post) -> Self {
        VersionedEntity::Post(post)
    }
}

/// A stored snapshot of one entity's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub soft_deleted_at: Option<DateTime<Utc>>,
}

impl Version {
    /// Create a snapshot stamped with the current time.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            content: content.into(),
            created_at: Utc::now().trunc_subsecs(6),
            soft_deleted_at: None,
        }
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.soft_deleted_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Persisted columns of a versioning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionColumn {
    Id,
    EntityType,
    EntityId,
    Content,
    CreatedAt,
    SoftDeletedAt,
}

impl VersionColumn {
    pub const ALL: [VersionColumn; 6] = [
        VersionColumn::Id,
        VersionColumn::EntityType,
        VersionColumn::EntityId,
        VersionColumn::Content,
        VersionColumn::CreatedAt,
        VersionColumn::SoftDeletedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionColumn::Id => "id",
            VersionColumn::EntityType => "entity_type",
            VersionColumn::EntityId => "entity_id",
            VersionColumn::Content => "content",
            VersionColumn::CreatedAt => "created_at",
            VersionColumn::SoftDeletedAt => "soft_deleted_at",
        }
    }
}

impl FromStr for VersionColumn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionColumn::ALL
            .iter()
            .copied()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown version column '{s}'")))
    }
}

/// Filter for listing snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionQuery {
    pub id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub order_by: Option<VersionColumn>,
    pub sort_order: SortOrder,
    pub offset: i64,
    pub limit: i64,
    pub with_deleted: bool,
}

impl VersionQuery {
    /// History of one entity, newest first.
    pub fn for_entity(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
            order_by: Some(VersionColumn::CreatedAt),
            sort_order: SortOrder::Desc,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_order(mut self, order_by: VersionColumn, sort_order: SortOrder) -> Self {
        self.order_by = Some(order_by);
        self.sort_order = sort_order;
        self
    }

    pub fn id_filter(&self) -> Option<&str> {
        non_blank(self.id.as_deref())
    }

    pub fn entity_type_filter(&self) -> Option<&str> {
        non_blank(self.entity_type.as_deref())
    }

    pub fn entity_id_filter(&self) -> Option<&str> {
        non_blank(self.entity_id.as_deref())
    }

    pub fn limit_value(&self) -> Option<u64> {
        positive(self.limit)
    }

    pub fn offset_value(&self) -> Option<u64> {
        positive(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_entity_dispatch() {
        let mut post = Post::new();
        post.set_title("Snapshot me");
        let entity = VersionedEntity::from(&post);

        assert_eq!(entity.entity_type(), EntityType::Post);
        assert_eq!(entity.entity_type().as_str(), "post");
        assert_eq!(entity.entity_id(), post.id());
        assert_eq!(entity.content().unwrap(), post.versioned_content().unwrap());
    }

    #[test]
    fn test_for_entity_defaults_to_newest_first() {
        let query = VersionQuery::for_entity("post", "abc").with_limit(5);
        assert_eq!(query.order_by, Some(VersionColumn::CreatedAt));
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.limit_value(), Some(5));
        assert_eq!(query.entity_id_filter(), Some("abc"));
    }

    #[test]
    fn test_new_version_ids_are_unique() {
        let a = Version::new("post", "1", "{}");
        let b = Version::new("post", "1", "{}");
        assert_ne!(a.id, b.id);
        assert!(!a.is_soft_deleted());
    }
}
