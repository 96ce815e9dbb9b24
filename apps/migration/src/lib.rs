//! Schema migrations for the blog store tables.
//!
//! Table names come from the same environment variables the store reads
//! (see [`blog_infra::StoreOptions::from_env`]).

pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_blog_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260101_000001_create_blog_tables::Migration)]
    }
}
