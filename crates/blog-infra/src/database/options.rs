use std::env;

use blog_core::RepoError;

use super::connections::flag;

pub const DEFAULT_POST_TABLE: &str = "blog_posts";
pub const DEFAULT_VERSIONING_TABLE: &str = "blog_posts_versions";

/// Options for building a post store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub post_table_name: String,
    pub versioning_enabled: bool,
    pub versioning_table_name: Option<String>,
    /// Create missing tables when the store is built.
    pub automigrate_enabled: bool,
    /// Log rendered SQL at debug level.
    pub debug_enabled: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POST_TABLE)
    }
}

impl StoreOptions {
    pub fn new(post_table_name: impl Into<String>) -> Self {
        Self {
            post_table_name: post_table_name.into(),
            versioning_enabled: false,
            versioning_table_name: None,
            automigrate_enabled: false,
            debug_enabled: false,
        }
    }

    pub fn with_versioning(mut self, table_name: impl Into<String>) -> Self {
        self.versioning_enabled = true;
        self.versioning_table_name = Some(table_name.into());
        self
    }

    pub fn with_automigrate(mut self, enabled: bool) -> Self {
        self.automigrate_enabled = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    /// Load options from the environment:
    ///
    /// - `BLOG_POST_TABLE` (default `blog_posts`)
    /// - `BLOG_VERSIONING_ENABLED`
    /// - `BLOG_VERSIONING_TABLE` (default `blog_posts_versions`)
    /// - `BLOG_AUTOMIGRATE`
    /// - `BLOG_DEBUG`
    pub fn from_env() -> Self {
        let enabled = |key: &str| env::var(key).map(|v| flag(&v)).unwrap_or(false);
        let versioning_enabled = enabled("BLOG_VERSIONING_ENABLED");

        Self {
            post_table_name: env::var("BLOG_POST_TABLE")
                .unwrap_or_else(|_| DEFAULT_POST_TABLE.to_string()),
            versioning_enabled,
            versioning_table_name: versioning_enabled.then(|| {
                env::var("BLOG_VERSIONING_TABLE")
                    .unwrap_or_else(|_| DEFAULT_VERSIONING_TABLE.to_string())
            }),
            automigrate_enabled: enabled("BLOG_AUTOMIGRATE"),
            debug_enabled: enabled("BLOG_DEBUG"),
        }
    }

    /// The versioning table name, when set and not blank.
    pub fn versioning_table(&self) -> Option<&str> {
        self.versioning_table_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), RepoError> {
        if self.post_table_name.trim().is_empty() {
            return Err(RepoError::Configuration("post table name is required".into()));
        }
        if self.versioning_enabled && self.versioning_table().is_none() {
            return Err(RepoError::Configuration(
                "versioning table name is required when versioning is enabled".into(),
            ));
        }
        Ok(())
    }
}
