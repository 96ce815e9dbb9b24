use blog_infra::StoreOptions;
use blog_infra::database::schema;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let options = StoreOptions::from_env();

        manager
            .create_table(schema::post_table(&options.post_table_name))
            .await?;
        tracing::info!(table = %options.post_table_name, "Created post table");

        if let Some(table) = versioning_table(&options) {
            manager.create_table(schema::version_table(table)).await?;
            manager.create_index(schema::version_index(table)).await?;
            tracing::info!(table, "Created versioning table");
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let options = StoreOptions::from_env();

        if let Some(table) = versioning_table(&options) {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }

        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new(&options.post_table_name))
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

fn versioning_table(options: &StoreOptions) -> Option<&str> {
    options
        .versioning_table()
        .filter(|_| options.versioning_enabled)
}
