use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Posts {
    Table,
    PubDate,
    IsPublished,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // Feed queries order by pub_date DESC and filter on the published flag.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_pub_date")
                    .table(Posts::Table)
                    .col(Posts::PubDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_is_published")
                    .table(Posts::Table)
                    .col(Posts::IsPublished)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_posts_pub_date").table(Posts::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_posts_is_published")
                    .table(Posts::Table)
                    .to_owned(),
            )
            .await
    }
}
