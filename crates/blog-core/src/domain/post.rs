use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::datetime::{self, MAX_DATETIME, NULL_DATETIME};
use crate::error::DomainError;

/// Columns changed since the post was last loaded or persisted, rendered in
/// storage form.
pub type Changeset = BTreeMap<PostColumn, String>;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Unpublished,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Unpublished => "unpublished",
            PostStatus::Trash => "trash",
        }
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "unpublished" => Ok(PostStatus::Unpublished),
            "trash" => Ok(PostStatus::Trash),
            other => Err(DomainError::Validation(format!("unknown post status '{other}'"))),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Featured flag. Persisted as the strings `yes`/`no`, never as a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Featured {
    Yes,
    #[default]
    No,
}

impl Featured {
    pub fn as_str(&self) -> &'static str {
        match self {
            Featured::Yes => "yes",
            Featured::No => "no",
        }
    }
}

impl FromStr for Featured {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Featured::Yes),
            "no" => Ok(Featured::No),
            other => Err(DomainError::Validation(format!(
                "featured must be 'yes' or 'no', got '{other}'"
            ))),
        }
    }
}

/// Format of the post body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Markdown => "markdown",
            ContentType::Html => "html",
            ContentType::PlainText => "plain_text",
        }
    }

    /// Editor used to render content of this type.
    pub fn editor(&self) -> &'static str {
        match self {
            ContentType::Markdown => "Markdown",
            ContentType::Html => "HtmlArea",
            ContentType::PlainText => "TextArea",
        }
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(ContentType::Markdown),
            "html" => Ok(ContentType::Html),
            "plain_text" => Ok(ContentType::PlainText),
            other => Err(DomainError::Validation(format!("unknown content type '{other}'"))),
        }
    }
}

/// Persisted columns of the post table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostColumn {
    Id,
    Status,
    Title,
    Content,
    Summary,
    AuthorId,
    CanonicalUrl,
    ImageUrl,
    Featured,
    MetaDescription,
    MetaKeywords,
    MetaRobots,
    Metas,
    Memo,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
    SoftDeletedAt,
}

impl PostColumn {
    pub const ALL: [PostColumn; 18] = [
        PostColumn::Id,
        PostColumn::Status,
        PostColumn::Title,
        PostColumn::Content,
        PostColumn::Summary,
        PostColumn::AuthorId,
        PostColumn::CanonicalUrl,
        PostColumn::ImageUrl,
        PostColumn::Featured,
        PostColumn::MetaDescription,
        PostColumn::MetaKeywords,
        PostColumn::MetaRobots,
        PostColumn::Metas,
        PostColumn::Memo,
        PostColumn::PublishedAt,
        PostColumn::CreatedAt,
        PostColumn::UpdatedAt,
        PostColumn::SoftDeletedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostColumn::Id => "id",
            PostColumn::Status => "status",
            PostColumn::Title => "title",
            PostColumn::Content => "content",
            PostColumn::Summary => "summary",
            PostColumn::AuthorId => "author_id",
            PostColumn::CanonicalUrl => "canonical_url",
            PostColumn::ImageUrl => "image_url",
            PostColumn::Featured => "featured",
            PostColumn::MetaDescription => "meta_description",
            PostColumn::MetaKeywords => "meta_keywords",
            PostColumn::MetaRobots => "meta_robots",
            PostColumn::Metas => "metas",
            PostColumn::Memo => "memo",
            PostColumn::PublishedAt => "published_at",
            PostColumn::CreatedAt => "created_at",
            PostColumn::UpdatedAt => "updated_at",
            PostColumn::SoftDeletedAt => "soft_deleted_at",
        }
    }

    /// Bookkeeping timestamps, excluded from versioned content.
    pub fn is_lifecycle_timestamp(&self) -> bool {
        matches!(
            self,
            PostColumn::CreatedAt | PostColumn::UpdatedAt | PostColumn::SoftDeletedAt
        )
    }
}

impl FromStr for PostColumn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostColumn::ALL
            .iter()
            .copied()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown post column '{s}'")))
    }
}

impl fmt::Display for PostColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const META_CONTENT_TYPE: &str = "content_type";
const META_EDITOR: &str = "editor";

/// Post entity - a blog post or article.
///
/// Mutation goes through setters; nothing is tracked inside them. Instead the
/// post remembers the field map it was last loaded or persisted with, and
/// [`Post::changes`] diffs the current state against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    id: String,
    status: PostStatus,
    title: String,
    content: String,
    summary: String,
    author_id: String,
    canonical_url: String,
    image_url: String,
    featured: Featured,
    meta_description: String,
    meta_keywords: String,
    meta_robots: String,
    metas: BTreeMap<String, String>,
    memo: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    soft_deleted_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    persisted: Option<Changeset>,
}

impl Default for Post {
    fn default() -> Self {
        Self::new()
    }
}

impl Post {
    /// Create a new draft post with a generated ID.
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7().to_string())
    }

    /// Create a new draft post with a caller-chosen ID.
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = datetime::now();
        Self {
            id: id.into(),
            status: PostStatus::Draft,
            title: String::new(),
            content: String::new(),
            summary: String::new(),
            author_id: String::new(),
            canonical_url: String::new(),
            image_url: String::new(),
            featured: Featured::No,
            meta_description: String::new(),
            meta_keywords: String::new(),
            meta_robots: String::new(),
            metas: BTreeMap::new(),
            memo: String::new(),
            published_at: None,
            created_at: now,
            updated_at: now,
            soft_deleted_at: None,
            persisted: None,
        }
    }

    /// Rebuild a post from a stored row. The result has no pending changes.
    pub fn hydrate(fields: &BTreeMap<PostColumn, String>) -> Result<Self, DomainError> {
        let mut post = Self::with_id(String::new());
        for (column, value) in fields {
            post.assign(*column, value)?;
        }

        if post.id.trim().is_empty() {
            return Err(DomainError::Validation("stored post has no id".to_string()));
        }

        post.mark_persisted();
        Ok(post)
    }

    // ============================ GETTERS ============================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> PostStatus {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn featured(&self) -> Featured {
        self.featured
    }

    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    pub fn meta_keywords(&self) -> &str {
        &self.meta_keywords
    }

    pub fn meta_robots(&self) -> &str {
        &self.meta_robots
    }

    pub fn metas(&self) -> &BTreeMap<String, String> {
        &self.metas
    }

    /// A single metadata value, empty when absent.
    pub fn meta(&self, key: &str) -> &str {
        self.metas.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn soft_deleted_at(&self) -> Option<DateTime<Utc>> {
        self.soft_deleted_at
    }

    /// Content type recorded in metadata, if any.
    pub fn content_type(&self) -> Option<ContentType> {
        self.metas
            .get(META_CONTENT_TYPE)
            .and_then(|value| value.parse().ok())
    }

    pub fn editor(&self) -> &str {
        self.meta(META_EDITOR)
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn is_unpublished(&self) -> bool {
        !self.is_published()
    }

    pub fn is_trashed(&self) -> bool {
        self.status == PostStatus::Trash
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.soft_deleted_at.is_some_and(|at| at <= Utc::now())
    }

    /// URL-friendly form of the title.
    pub fn slug(&self) -> String {
        self.title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }

    // ============================ SETTERS ============================

    pub fn set_status(&mut self, status: PostStatus) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.summary = summary.into();
        self
    }

    pub fn set_author_id(&mut self, author_id: impl Into<String>) -> &mut Self {
        self.author_id = author_id.into();
        self
    }

    pub fn set_canonical_url(&mut self, canonical_url: impl Into<String>) -> &mut Self {
        self.canonical_url = canonical_url.into();
        self
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) -> &mut Self {
        self.image_url = image_url.into();
        self
    }

    pub fn set_featured(&mut self, featured: Featured) -> &mut Self {
        self.featured = featured;
        self
    }

    pub fn set_meta_description(&mut self, meta_description: impl Into<String>) -> &mut Self {
        self.meta_description = meta_description.into();
        self
    }

    pub fn set_meta_keywords(&mut self, meta_keywords: impl Into<String>) -> &mut Self {
        self.meta_keywords = meta_keywords.into();
        self
    }

    pub fn set_meta_robots(&mut self, meta_robots: impl Into<String>) -> &mut Self {
        self.meta_robots = meta_robots.into();
        self
    }

    pub fn set_metas(&mut self, metas: BTreeMap<String, String>) -> &mut Self {
        self.metas = metas;
        self
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.metas.insert(key.into(), value.into());
        self
    }

    /// Merge entries into the existing metadata, overwriting equal keys.
    pub fn add_metas<K, V>(&mut self, metas: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metas
            .extend(metas.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Record the content type together with the editor that renders it.
    pub fn set_content_type(&mut self, content_type: ContentType) -> &mut Self {
        self.set_meta(META_CONTENT_TYPE, content_type.as_str())
            .set_meta(META_EDITOR, content_type.editor())
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.memo = memo.into();
        self
    }

    pub fn set_published_at(&mut self, published_at: Option<DateTime<Utc>>) -> &mut Self {
        self.published_at = published_at;
        self
    }

    pub fn set_created_at(&mut self, created_at: DateTime<Utc>) -> &mut Self {
        self.created_at = created_at;
        self
    }

    pub fn set_updated_at(&mut self, updated_at: DateTime<Utc>) -> &mut Self {
        self.updated_at = updated_at;
        self
    }

    pub fn set_soft_deleted_at(&mut self, soft_deleted_at: Option<DateTime<Utc>>) -> &mut Self {
        self.soft_deleted_at = soft_deleted_at;
        self
    }

    // ========================= CHANGE TRACKING =========================

    /// Every column in storage form. Unset timestamps become their sentinels.
    pub fn field_map(&self) -> Changeset {
        PostColumn::ALL
            .iter()
            .map(|column| (*column, self.render(*column)))
            .collect()
    }

    /// Columns whose value differs from the last loaded or persisted state.
    /// A post that was never persisted reports every column.
    pub fn changes(&self) -> Changeset {
        let current = self.field_map();
        match &self.persisted {
            None => current,
            Some(baseline) => current
                .into_iter()
                .filter(|(column, value)| baseline.get(column) != Some(value))
                .collect(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Take the current state as the new baseline for [`Post::changes`].
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.field_map());
    }

    /// Whether the post was loaded from or written to storage.
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_some()
    }

    /// The id the post was last loaded or persisted with.
    pub fn persisted_id(&self) -> Option<&str> {
        self.persisted
            .as_ref()
            .and_then(|baseline| baseline.get(&PostColumn::Id))
            .map(String::as_str)
    }

    // =========================== VERSIONING ===========================

    /// Canonical JSON of the persisted fields minus the lifecycle timestamps.
    /// Keys are sorted so equal content always yields equal strings.
    pub fn versioned_content(&self) -> Result<String, DomainError> {
        let content: BTreeMap<&'static str, String> = self
            .field_map()
            .into_iter()
            .filter(|(column, _)| !column.is_lifecycle_timestamp())
            .map(|(column, value)| (column.as_str(), value))
            .collect();

        serde_json::to_string(&content).map_err(|e| DomainError::Serialization(e.to_string()))
    }

    /// Restore fields from a snapshot produced by [`Post::versioned_content`].
    ///
    /// Lifecycle timestamps and unknown keys are ignored; `updated_at` is reset
    /// to the current time. Nothing is applied unless every value is valid.
    ///
    /// A persisted post only accepts snapshots of itself: a snapshot carrying
    /// another id is rejected. A post that was never persisted takes the
    /// snapshot's id.
    pub fn apply_versioned_content(&mut self, content: &str) -> Result<(), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Serialization(
                "versioned content is empty".to_string(),
            ));
        }

        let data: BTreeMap<String, String> = serde_json::from_str(content)
            .map_err(|e| DomainError::Serialization(format!("invalid versioned content: {e}")))?;

        if let Some(snapshot_id) = data.get(PostColumn::Id.as_str()) {
            if self.is_persisted() && snapshot_id != &self.id {
                return Err(DomainError::Validation(format!(
                    "snapshot of post '{snapshot_id}' cannot be applied to post '{}'",
                    self.id
                )));
            }
        }

        let mut restored = self.clone();
        for (key, value) in &data {
            let Ok(column) = key.parse::<PostColumn>() else {
                continue;
            };
            if column.is_lifecycle_timestamp() {
                continue;
            }
            restored.assign(column, value)?;
        }
        restored.updated_at = datetime::now();

        *self = restored;
        Ok(())
    }

    fn render(&self, column: PostColumn) -> String {
        match column {
            PostColumn::Id => self.id.clone(),
            PostColumn::Status => self.status.as_str().to_string(),
            PostColumn::Title => self.title.clone(),
            PostColumn::Content => self.content.clone(),
            PostColumn::Summary => self.summary.clone(),
            PostColumn::AuthorId => self.author_id.clone(),
            PostColumn::CanonicalUrl => self.canonical_url.clone(),
            PostColumn::ImageUrl => self.image_url.clone(),
            PostColumn::Featured => self.featured.as_str().to_string(),
            PostColumn::MetaDescription => self.meta_description.clone(),
            PostColumn::MetaKeywords => self.meta_keywords.clone(),
            PostColumn::MetaRobots => self.meta_robots.clone(),
            PostColumn::Metas => encode_metas(&self.metas),
            PostColumn::Memo => self.memo.clone(),
            PostColumn::PublishedAt => {
                datetime::format_optional(self.published_at.as_ref(), NULL_DATETIME)
            }
            PostColumn::CreatedAt => datetime::format_datetime(&self.created_at),
            PostColumn::UpdatedAt => datetime::format_datetime(&self.updated_at),
            PostColumn::SoftDeletedAt => {
                datetime::format_optional(self.soft_deleted_at.as_ref(), MAX_DATETIME)
            }
        }
    }

    fn assign(&mut self, column: PostColumn, value: &str) -> Result<(), DomainError> {
        match column {
            PostColumn::Id => self.id = value.to_string(),
            PostColumn::Status => self.status = value.parse()?,
            PostColumn::Title => self.title = value.to_string(),
            PostColumn::Content => self.content = value.to_string(),
            PostColumn::Summary => self.summary = value.to_string(),
            PostColumn::AuthorId => self.author_id = value.to_string(),
            PostColumn::CanonicalUrl => self.canonical_url = value.to_string(),
            PostColumn::ImageUrl => self.image_url = value.to_string(),
            PostColumn::Featured => self.featured = value.parse()?,
            PostColumn::MetaDescription => self.meta_description = value.to_string(),
            PostColumn::MetaKeywords => self.meta_keywords = value.to_string(),
            PostColumn::MetaRobots => self.meta_robots = value.to_string(),
            PostColumn::Metas => self.metas = decode_metas(value)?,
            PostColumn::Memo => self.memo = value.to_string(),
            PostColumn::PublishedAt => {
                self.published_at = datetime::parse_optional(value, NULL_DATETIME)?
            }
            PostColumn::CreatedAt => self.created_at = datetime::parse_datetime(value)?,
            PostColumn::UpdatedAt => self.updated_at = datetime::parse_datetime(value)?,
            PostColumn::SoftDeletedAt => {
                self.soft_deleted_at = datetime::parse_optional(value, MAX_DATETIME)?
            }
        }
        Ok(())
    }
}

fn encode_metas(metas: &BTreeMap<String, String>) -> String {
    // String keys and values cannot fail to serialize.
    serde_json::to_string(metas).unwrap_or_else(|_| String::from("{}"))
}

fn decode_metas(value: &str) -> Result<BTreeMap<String, String>, DomainError> {
    if value.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(value)
        .map_err(|e| DomainError::Serialization(format!("invalid metas: {e}")))
}
