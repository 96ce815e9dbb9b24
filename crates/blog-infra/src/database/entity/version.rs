//! Snapshot row as stored in a versioning table.

use sea_orm::FromQueryResult;

use blog_core::DomainError;
use blog_core::domain::datetime::{
    MAX_DATETIME, format_datetime_micros, parse_datetime, parse_optional,
};
use blog_core::domain::{Version, VersionColumn};

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct VersionRow {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub content: String,
    pub created_at: String,
    pub soft_deleted_at: String,
}

impl VersionRow {
    /// Column/value pairs in [`VersionColumn::ALL`] order.
    pub fn into_values(self) -> [(VersionColumn, String); 6] {
        [
            (VersionColumn::Id, self.id),
            (VersionColumn::EntityType, self.entity_type),
            (VersionColumn::EntityId, self.entity_id),
            (VersionColumn::Content, self.content),
            (VersionColumn::CreatedAt, self.created_at),
            (VersionColumn::SoftDeletedAt, self.soft_deleted_at),
        ]
    }
}

/// Timestamps keep microseconds so snapshots taken within one second still
/// order correctly.
impl From<&Version> for VersionRow {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id.clone(),
            entity_type: version.entity_type.clone(),
            entity_id: version.entity_id.clone(),
            content: version.content.clone(),
            created_at: format_datetime_micros(&version.created_at),
            soft_deleted_at: version
                .soft_deleted_at
                .as_ref()
                .map(format_datetime_micros)
                .unwrap_or_else(|| MAX_DATETIME.to_string()),
        }
    }
}

impl TryFrom<VersionRow> for Version {
    type Error = DomainError;

    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: parse_datetime(&row.created_at)?,
            soft_deleted_at: parse_optional(&row.soft_deleted_at, MAX_DATETIME)?,
            id: row.id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            content: row.content,
        })
    }
}
