//! Table definitions for the post and versioning tables.

use sea_orm::sea_query::{
    Alias, ColumnDef, Index, IndexCreateStatement, Table, TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DbConn};

use blog_core::RepoError;
use blog_core::domain::{PostColumn, VersionColumn};

use super::options::StoreOptions;
use super::query_builder::render;
use super::sql_base::db_error;

pub fn post_table(table: &str) -> TableCreateStatement {
    let mut statement = Table::create();
    statement.table(Alias::new(table)).if_not_exists();
    for column in PostColumn::ALL {
        statement.col(&mut post_column(column));
    }
    statement.to_owned()
}

fn post_column(column: PostColumn) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column.as_str()));
    match column {
        PostColumn::Id => def.string_len(40).primary_key(),
        PostColumn::Status | PostColumn::AuthorId => def.string_len(40),
        PostColumn::Featured => def.string_len(3),
        PostColumn::Title
        | PostColumn::CanonicalUrl
        | PostColumn::MetaDescription
        | PostColumn::MetaKeywords
        | PostColumn::MetaRobots => def.string_len(255),
        PostColumn::Content
        | PostColumn::Summary
        | PostColumn::ImageUrl
        | PostColumn::Metas
        | PostColumn::Memo => def.text(),
        PostColumn::PublishedAt
        | PostColumn::CreatedAt
        | PostColumn::UpdatedAt
        | PostColumn::SoftDeletedAt => def.string_len(32),
    };
    def.not_null();
    def
}

pub fn version_table(table: &str) -> TableCreateStatement {
    let mut statement = Table::create();
    statement.table(Alias::new(table)).if_not_exists();
    for column in VersionColumn::ALL {
        statement.col(&mut version_column(column));
    }
    statement.to_owned()
}

fn version_column(column: VersionColumn) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column.as_str()));
    match column {
        VersionColumn::Id => def.string_len(40).primary_key(),
        VersionColumn::EntityType | VersionColumn::EntityId => def.string_len(40),
        VersionColumn::Content => def.text(),
        VersionColumn::CreatedAt | VersionColumn::SoftDeletedAt => def.string_len(32),
    };
    def.not_null();
    def
}

/// Index serving the latest-snapshot lookup.
pub fn version_index(table: &str) -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(format!("idx_{table}_entity"))
        .table(Alias::new(table))
        .col(Alias::new(VersionColumn::EntityType.as_str()))
        .col(Alias::new(VersionColumn::EntityId.as_str()))
        .col(Alias::new(VersionColumn::CreatedAt.as_str()))
        .to_owned()
}

/// Create whichever tables the options call for, skipping existing ones.
pub async fn auto_migrate(db: &DbConn, options: &StoreOptions) -> Result<(), RepoError> {
    let backend = db.get_database_backend();

    db.execute(render(backend, &post_table(&options.post_table_name)))
        .await
        .map_err(db_error)?;
    tracing::info!(table = %options.post_table_name, "Post table ready");

    if let Some(table) = options.versioning_table().filter(|_| options.versioning_enabled) {
        db.execute(render(backend, &version_table(table)))
            .await
            .map_err(db_error)?;
        db.execute(render(backend, &version_index(table)))
            .await
            .map_err(db_error)?;
        tracing::info!(table, "Versioning table ready");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::DatabaseBackend;

    use super::*;

    #[test]
    fn test_post_table_lists_every_column() {
        let sql = render(DatabaseBackend::Sqlite, &post_table("blog_posts")).sql;

        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "blog_posts""#));
        for column in PostColumn::ALL {
            assert!(sql.contains(&format!(r#""{}""#, column.as_str())), "{column}");
        }
        assert!(sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_version_index_covers_latest_lookup() {
        let sql = render(DatabaseBackend::Postgres, &version_index("blog_posts_versions")).sql;

        assert!(sql.contains("idx_blog_posts_versions_entity"));
        assert!(sql.contains(r#""entity_type", "entity_id", "created_at""#));
    }
}
