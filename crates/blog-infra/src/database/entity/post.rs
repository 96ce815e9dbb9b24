//! Post row as stored in a post table.

use std::collections::BTreeMap;

use sea_orm::FromQueryResult;

use blog_core::DomainError;
use blog_core::domain::{Post, PostColumn};

/// Every post column is stored as text; typed values are restored by
/// [`Post::hydrate`].
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct PostRow {
    pub id: String,
    pub status: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author_id: String,
    pub canonical_url: String,
    pub image_url: String,
    pub featured: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_robots: String,
    pub metas: String,
    pub memo: String,
    pub published_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub soft_deleted_at: String,
}

impl PostRow {
    pub fn into_fields(self) -> BTreeMap<PostColumn, String> {
        BTreeMap::from([
            (PostColumn::Id, self.id),
            (PostColumn::Status, self.status),
            (PostColumn::Title, self.title),
            (PostColumn::Content, self.content),
            (PostColumn::Summary, self.summary),
            (PostColumn::AuthorId, self.author_id),
            (PostColumn::CanonicalUrl, self.canonical_url),
            (PostColumn::ImageUrl, self.image_url),
            (PostColumn::Featured, self.featured),
            (PostColumn::MetaDescription, self.meta_description),
            (PostColumn::MetaKeywords, self.meta_keywords),
            (PostColumn::MetaRobots, self.meta_robots),
            (PostColumn::Metas, self.metas),
            (PostColumn::Memo, self.memo),
            (PostColumn::PublishedAt, self.published_at),
            (PostColumn::CreatedAt, self.created_at),
            (PostColumn::UpdatedAt, self.updated_at),
            (PostColumn::SoftDeletedAt, self.soft_deleted_at),
        ])
    }
}

/// Conversion from a stored row to a domain Post with no pending changes.
impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Post::hydrate(&row.into_fields())
    }
}
