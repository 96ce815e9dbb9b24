//! SQL snapshot store backing the versioning engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbConn;
use sea_orm::sea_query::{Alias, Expr, Query};

use blog_core::RepoError;
use blog_core::domain::datetime::format_datetime_micros;
use blog_core::domain::{Version, VersionColumn, VersionQuery};
use blog_core::ports::VersionRepository;

use super::entity::version::VersionRow;
use super::query_builder::{build_version_query, version_col};
use super::sql_base::{SqlExecutor, require, row_error};

pub struct SqlVersionRepository {
    sql: SqlExecutor,
    table: String,
}

impl SqlVersionRepository {
    pub fn new(db: impl Into<Arc<DbConn>>, table: impl Into<String>, debug: bool) -> Self {
        Self {
            sql: SqlExecutor::new(db.into(), debug),
            table: table.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl VersionRepository for SqlVersionRepository {
    async fn create(&self, version: &Version) -> Result<(), RepoError> {
        require("version id", &version.id)?;

        let values = VersionRow::from(version).into_values();
        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(&self.table))
            .columns(values.iter().map(|(column, _)| Alias::new(column.as_str())));
        insert
            .values(values.into_iter().map(|(_, value)| Expr::value(value)))
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.sql.execute(&insert).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Version>, RepoError> {
        require("version id", id)?;
        let query = VersionQuery {
            id: Some(id.to_string()),
            limit: 1,
            ..Default::default()
        };
        Ok(self.list(query).await?.into_iter().next())
    }

    async fn list(&self, query: VersionQuery) -> Result<Vec<Version>, RepoError> {
        let select = build_version_query(&self.table, &query, Utc::now());
        let rows: Vec<VersionRow> = self.sql.fetch_all(&select).await?;

        rows.into_iter()
            .map(|row| Version::try_from(row).map_err(row_error))
            .collect()
    }

    async fn update(&self, version: &Version) -> Result<(), RepoError> {
        require("version id", &version.id)?;

        let mut update = Query::update();
        update
            .table(Alias::new(&self.table))
            .values(
                VersionRow::from(version)
                    .into_values()
                    .into_iter()
                    .filter(|(column, _)| *column != VersionColumn::Id)
                    .map(|(column, value)| (Alias::new(column.as_str()), Expr::value(value))),
            )
            .and_where(version_col(VersionColumn::Id).eq(version.id.as_str()));

        self.sql.execute(&update).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        require("version id", id)?;

        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(&self.table))
            .and_where(version_col(VersionColumn::Id).eq(id));

        self.sql.execute(&delete).await?;
        Ok(())
    }

    async fn soft_delete_by_id(&self, id: &str) -> Result<(), RepoError> {
        require("version id", id)?;

        let mut update = Query::update();
        update
            .table(Alias::new(&self.table))
            .value(
                Alias::new(VersionColumn::SoftDeletedAt.as_str()),
                format_datetime_micros(&Utc::now()),
            )
            .and_where(version_col(VersionColumn::Id).eq(id));

        self.sql.execute(&update).await?;
        Ok(())
    }
}
