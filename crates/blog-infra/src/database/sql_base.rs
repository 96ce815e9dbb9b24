use std::sync::Arc;

use sea_orm::{ConnectionTrait, DbConn, DbErr, FromQueryResult, QueryResult, Statement, StatementBuilder};

use blog_core::{DomainError, RepoError};

use super::query_builder::render;

/// Shared statement runner for the SQL repositories.
///
/// Renders sea-query statements for the connection's backend, optionally
/// logs them, and maps driver errors onto [`RepoError`]. The connection is
/// shared so the post and snapshot stores can run on the same pool.
pub(crate) struct SqlExecutor {
    db: Arc<DbConn>,
    debug: bool,
}

impl SqlExecutor {
    pub fn new(db: Arc<DbConn>, debug: bool) -> Self {
        Self { db, debug }
    }

    fn statement<S: StatementBuilder>(&self, statement: &S) -> Statement {
        let statement = render(self.db.get_database_backend(), statement);
        if self.debug {
            tracing::debug!(sql = %statement.sql, values = ?statement.values, "Executing statement");
        }
        statement
    }

    /// Run a write statement and return the number of affected rows.
    pub async fn execute<S: StatementBuilder>(&self, statement: &S) -> Result<u64, RepoError> {
        self.db
            .execute(self.statement(statement))
            .await
            .map(|result| result.rows_affected())
            .map_err(db_error)
    }

    pub async fn fetch_all<M, S>(&self, statement: &S) -> Result<Vec<M>, RepoError>
    where
        M: FromQueryResult,
        S: StatementBuilder,
    {
        M::find_by_statement(self.statement(statement))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    pub async fn fetch_one<S: StatementBuilder>(
        &self,
        statement: &S,
    ) -> Result<Option<QueryResult>, RepoError> {
        self.db
            .query_one(self.statement(statement))
            .await
            .map_err(db_error)
    }
}

pub(crate) fn db_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        _ => RepoError::Query(err.to_string()),
    }
}

/// A stored row that fails to hydrate is a storage problem, not a caller one.
pub(crate) fn row_error(err: DomainError) -> RepoError {
    RepoError::Query(format!("invalid stored row: {err}"))
}

pub(crate) fn require(what: &str, value: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::Precondition(format!("{what} is empty")));
    }
    Ok(())
}
