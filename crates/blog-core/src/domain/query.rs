//! Filter, sort and pagination options for post queries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::{PostColumn, PostStatus};
use crate::error::DomainError;

/// Sort direction. Descending unless asked otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(DomainError::Validation(format!("unknown sort order '{s}'")))
        }
    }
}

/// Transient filter specification for listing and counting posts.
///
/// Every filter is optional and all present filters are combined with AND.
/// Blank strings and empty sets count as unset, as do `limit`/`offset`
/// values of zero or below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostQueryOptions {
    pub id: Option<String>,
    pub id_in: Vec<String>,
    pub status: Option<PostStatus>,
    pub status_in: Vec<PostStatus>,
    /// Case-insensitive match on title or content, or exact match on id.
    /// `%` and `_` in the term act as LIKE wildcards.
    pub search: Option<String>,
    pub created_at_greater_than: Option<DateTime<Utc>>,
    pub created_at_less_than: Option<DateTime<Utc>>,
    pub offset: i64,
    pub limit: i64,
    pub order_by: Option<PostColumn>,
    pub sort_order: SortOrder,
    pub count_only: bool,
    pub with_deleted: bool,
}

impl PostQueryOptions {
    /// Exact-id lookup of a single row.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            limit: 1,
            ..Default::default()
        }
    }

    /// Non-blank exact id filter.
    pub fn id_filter(&self) -> Option<&str> {
        non_blank(self.id.as_deref())
    }

    /// Non-blank search term.
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn limit_value(&self) -> Option<u64> {
        positive(self.limit)
    }

    pub fn offset_value(&self) -> Option<u64> {
        positive(self.offset)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn positive(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}
