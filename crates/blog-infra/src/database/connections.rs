use std::env;
#[cfg(feature = "sql")]
use std::time::Duration;

#[cfg(feature = "sql")]
use sea_orm::{ConnectOptions, Database, DbConn};

#[cfg(feature = "sql")]
use blog_core::RepoError;

/// Connection settings for the database holding the post and version tables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Log every statement through the driver.
    pub sql_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            min_connections: 1,
            sql_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Read `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS` and
    /// `DB_SQL_LOGGING`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.min_connections),
            sql_logging: env::var("DB_SQL_LOGGING")
                .map(|v| flag(&v))
                .unwrap_or(defaults.sql_logging),
        }
    }

    /// Open a connection pool.
    #[cfg(feature = "sql")]
    pub async fn connect(&self) -> Result<DbConn, RepoError> {
        tracing::info!("Connecting to database...");

        let options = ConnectOptions::new(&self.url)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(self.sql_logging)
            .to_owned();

        let db = Database::connect(options)
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        tracing::info!("Database connected (pool: {})", self.max_connections);
        Ok(db)
    }
}

fn parse_var(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default, "Invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Parse a boolean environment flag. Anything but `true`, `1`, `yes` or `on`
/// is false.
pub(crate) fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
