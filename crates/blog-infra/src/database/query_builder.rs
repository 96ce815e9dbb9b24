//! Query construction for the post and versioning tables.
//!
//! Builders are pure: they turn a filter object into a sea-query statement
//! and never touch the database. Every user-supplied value ends up as a bind
//! parameter once the statement is rendered for a backend.

use blog_core::domain::datetime::{format_datetime, format_datetime_micros};
use blog_core::domain::{PostColumn, PostQueryOptions, SortOrder, VersionColumn, VersionQuery};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Asterisk, Condition, Expr, Func, Order, Query, SelectStatement};
use sea_orm::{DatabaseBackend, Statement, StatementBuilder};

/// Alias of the scalar produced by count queries.
pub const COUNT_ALIAS: &str = "count";

pub(crate) fn post_col(column: PostColumn) -> Expr {
    Expr::col(Alias::new(column.as_str()))
}

pub(crate) fn version_col(column: VersionColumn) -> Expr {
    Expr::col(Alias::new(column.as_str()))
}

/// Build a `SELECT` (or `COUNT` when `count_only` is set) over the post table.
///
/// Rows are visible when `soft_deleted_at > now`, which keeps rows carrying
/// the far-future sentinel and drops rows deleted at or before `now`.
pub fn build_post_query(
    table: &str,
    options: &PostQueryOptions,
    now: DateTime<Utc>,
) -> SelectStatement {
    let mut condition = Condition::all();

    if let Some(id) = options.id_filter() {
        condition = condition.add(post_col(PostColumn::Id).eq(id));
    }

    if !options.id_in.is_empty() {
        condition = condition.add(post_col(PostColumn::Id).is_in(options.id_in.iter().cloned()));
    }

    if let Some(status) = options.status {
        condition = condition.add(post_col(PostColumn::Status).eq(status.as_str()));
    }

    if !options.status_in.is_empty() {
        condition = condition.add(
            post_col(PostColumn::Status).is_in(options.status_in.iter().map(|s| s.as_str())),
        );
    }

    if let Some(term) = options.search_term() {
        let pattern = format!("%{}%", term.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(post_col(PostColumn::Title))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(post_col(PostColumn::Content))).like(pattern))
                .add(post_col(PostColumn::Id).eq(term)),
        );
    }

    if let Some(after) = &options.created_at_greater_than {
        condition = condition.add(post_col(PostColumn::CreatedAt).gt(format_datetime(after)));
    }

    if let Some(before) = &options.created_at_less_than {
        condition = condition.add(post_col(PostColumn::CreatedAt).lt(format_datetime(before)));
    }

    if !options.with_deleted {
        condition = condition.add(post_col(PostColumn::SoftDeletedAt).gt(format_datetime(&now)));
    }

    let mut query = Query::select();
    query.from(Alias::new(table));
    if !condition.is_empty() {
        query.cond_where(condition);
    }

    if options.count_only {
        query
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new(COUNT_ALIAS))
            .limit(1);
        return query;
    }

    query.columns(PostColumn::ALL.iter().map(|c| Alias::new(c.as_str())));

    if let Some(order_by) = options.order_by {
        query.order_by(Alias::new(order_by.as_str()), order(options.sort_order));
    }

    apply_window(&mut query, options.limit_value(), options.offset_value());
    query
}

/// Build a `SELECT` over a versioning table.
///
/// Ordering by `created_at` also orders by `id`, so snapshots written within
/// the same microsecond still come back in creation order.
pub fn build_version_query(table: &str, query: &VersionQuery, now: DateTime<Utc>) -> SelectStatement {
    let mut condition = Condition::all();

    if let Some(id) = query.id_filter() {
        condition = condition.add(version_col(VersionColumn::Id).eq(id));
    }

    if let Some(entity_type) = query.entity_type_filter() {
        condition = condition.add(version_col(VersionColumn::EntityType).eq(entity_type));
    }

    if let Some(entity_id) = query.entity_id_filter() {
        condition = condition.add(version_col(VersionColumn::EntityId).eq(entity_id));
    }

    if !query.with_deleted {
        condition = condition
            .add(version_col(VersionColumn::SoftDeletedAt).gt(format_datetime_micros(&now)));
    }

    let mut select = Query::select();
    select
        .from(Alias::new(table))
        .columns(VersionColumn::ALL.iter().map(|c| Alias::new(c.as_str())));
    if !condition.is_empty() {
        select.cond_where(condition);
    }

    if let Some(order_by) = query.order_by {
        let direction = order(query.sort_order);
        select.order_by(Alias::new(order_by.as_str()), direction.clone());
        if order_by == VersionColumn::CreatedAt {
            select.order_by(Alias::new(VersionColumn::Id.as_str()), direction);
        }
    }

    apply_window(&mut select, query.limit_value(), query.offset_value());
    select
}

/// Render a statement for the given backend as SQL text plus bind values.
pub fn render<S: StatementBuilder>(backend: DatabaseBackend, statement: &S) -> Statement {
    backend.build(statement)
}

fn order(sort_order: SortOrder) -> Order {
    match sort_order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

fn apply_window(select: &mut SelectStatement, limit: Option<u64>, offset: Option<u64>) {
    if let Some(limit) = limit {
        select.limit(limit);
    }
    if let Some(offset) = offset {
        select.offset(offset);
    }
}
