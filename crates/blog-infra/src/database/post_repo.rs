//! SQL post store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbConn;
use sea_orm::sea_query::{Alias, Expr, Query};

use blog_core::RepoError;
use blog_core::domain::{
    Post, PostColumn, PostQueryOptions, PostStatus, SortOrder, VersionedEntity, datetime,
};
use blog_core::ports::PostRepository;
use blog_core::versioning::Versioning;

use super::entity::post::PostRow;
use super::options::StoreOptions;
use super::query_builder::{COUNT_ALIAS, build_post_query, post_col};
use super::schema;
use super::sql_base::{SqlExecutor, require, row_error};
use super::version_repo::SqlVersionRepository;

/// Post store over any sea-orm connection, with a configurable table name.
pub struct SqlPostRepository {
    sql: SqlExecutor,
    table: String,
    versioning: Versioning,
}

impl SqlPostRepository {
    /// Build a store from validated options.
    ///
    /// With versioning enabled the snapshots live in a SQL table on the same
    /// connection. With auto-migration enabled the tables are created first.
    pub async fn new(db: DbConn, options: StoreOptions) -> Result<Self, RepoError> {
        options.validate()?;
        let db = Arc::new(db);

        let versioning = match options.versioning_table() {
            Some(table) if options.versioning_enabled => Versioning::enabled(Arc::new(
                SqlVersionRepository::new(Arc::clone(&db), table, options.debug_enabled),
            )),
            _ => Versioning::disabled(),
        };

        if options.automigrate_enabled {
            schema::auto_migrate(&db, &options).await?;
        }

        tracing::debug!(
            table = %options.post_table_name,
            versioning = versioning.is_enabled(),
            "Post store ready"
        );

        Ok(Self {
            sql: SqlExecutor::new(db, options.debug_enabled),
            table: options.post_table_name,
            versioning,
        })
    }

    /// Replace the snapshot backend.
    pub fn with_versioning(mut self, versioning: Versioning) -> Self {
        self.versioning = versioning;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    async fn first(&self, options: PostQueryOptions) -> Result<Option<Post>, RepoError> {
        Ok(self.list(options).await?.into_iter().next())
    }

    async fn snapshot(&self, post: &Post) -> Result<(), RepoError> {
        self.versioning.track(VersionedEntity::from(post)).await?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn create(&self, post: &mut Post) -> Result<(), RepoError> {
        let now = datetime::now();
        post.set_created_at(now).set_updated_at(now);

        let fields = post.field_map();
        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(&self.table))
            .columns(fields.keys().map(|column| Alias::new(column.as_str())));
        insert
            .values(fields.into_values().map(Expr::value))
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.sql.execute(&insert).await?;
        post.mark_persisted();
        tracing::debug!(post_id = %post.id(), "Post created");

        self.snapshot(post).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError> {
        require("post id", id)?;
        self.first(PostQueryOptions::by_id(id)).await
    }

    async fn list(&self, options: PostQueryOptions) -> Result<Vec<Post>, RepoError> {
        let select = build_post_query(&self.table, &options, Utc::now());
        let rows: Vec<PostRow> = self.sql.fetch_all(&select).await?;

        rows.into_iter()
            .map(|row| Post::try_from(row).map_err(row_error))
            .collect()
    }

    async fn count(&self, options: PostQueryOptions) -> Result<i64, RepoError> {
        let options = PostQueryOptions {
            count_only: true,
            ..options
        };
        let select = build_post_query(&self.table, &options, Utc::now());

        let row = self
            .sql
            .fetch_one(&select)
            .await?
            .ok_or_else(|| RepoError::Query("count query returned no rows".into()))?;

        row.try_get::<i64>("", COUNT_ALIAS)
            .map_err(|e| RepoError::Query(format!("unparsable count: {e}")))
    }

    async fn update(&self, post: &mut Post) -> Result<(), RepoError> {
        if let Some(persisted) = post.persisted_id().filter(|id| *id != post.id()) {
            return Err(RepoError::Precondition(format!(
                "post id changed from '{persisted}' to '{}'",
                post.id()
            )));
        }

        // A post that was never persisted reports every column, id included.
        let mut changes = post.changes();
        changes.remove(&PostColumn::Id);
        if changes.is_empty() {
            return Ok(());
        }
        require("post id", post.id())?;

        let columns: Vec<&str> = changes.keys().map(|column| column.as_str()).collect();
        let mut update = Query::update();
        update
            .table(Alias::new(&self.table))
            .values(
                changes
                    .into_iter()
                    .map(|(column, value)| (Alias::new(column.as_str()), Expr::value(value))),
            )
            .and_where(post_col(PostColumn::Id).eq(post.id()));

        if self.sql.execute(&update).await? == 0 {
            return Err(RepoError::NotFound);
        }
        post.mark_persisted();
        tracing::debug!(post_id = %post.id(), ?columns, "Post updated");

        self.snapshot(post).await
    }

    async fn soft_delete(&self, post: &mut Post) -> Result<(), RepoError> {
        post.set_soft_deleted_at(Some(datetime::now()));
        self.update(post).await
    }

    async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        require("post id", id)?;
        let mut post = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        self.soft_delete(&mut post).await
    }

    async fn trash(&self, post: &mut Post) -> Result<(), RepoError> {
        post.set_status(PostStatus::Trash);
        self.update(post).await
    }

    async fn delete(&self, post: &Post) -> Result<(), RepoError> {
        self.delete_by_id(post.id()).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        require("post id", id)?;

        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(&self.table))
            .and_where(post_col(PostColumn::Id).eq(id));

        self.sql.execute(&delete).await?;
        tracing::debug!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn find_previous(&self, post: &Post) -> Result<Option<Post>, RepoError> {
        self.first(PostQueryOptions {
            created_at_less_than: Some(post.created_at()),
            order_by: Some(PostColumn::CreatedAt),
            sort_order: SortOrder::Desc,
            limit: 1,
            ..Default::default()
        })
        .await
    }

    async fn find_next(&self, post: &Post) -> Result<Option<Post>, RepoError> {
        self.first(PostQueryOptions {
            created_at_greater_than: Some(post.created_at()),
            order_by: Some(PostColumn::CreatedAt),
            sort_order: SortOrder::Asc,
            limit: 1,
            ..Default::default()
        })
        .await
    }

    fn versioning(&self) -> &Versioning {
        &self.versioning
    }
}
