//! Create clubs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clubs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clubs::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clubs::Name).string().not_null())
                    .col(ColumnDef::new(Clubs::City).string())
                    .col(ColumnDef::new(Clubs::Country).string())
                    .col(ColumnDef::new(Clubs::League).string())
                    .col(
                        ColumnDef::new(Clubs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clubs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clubs_country")
                    .table(Clubs::Table)
                    .col(Clubs::Country)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clubs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Clubs {
    Table,
    Id,
    Name,
    City,
    Country,
    League,
    CreatedAt,
    UpdatedAt,
}
