//! Create players table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_clubs::Clubs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::FirstName).string().not_null())
                    .col(ColumnDef::new(Players::LastName).string().not_null())
                    .col(ColumnDef::new(Players::Position).string())
                    .col(ColumnDef::new(Players::Nationality).string())
                    .col(
                        ColumnDef::new(Players::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Players::ClubId).string_len(36))
                    .col(ColumnDef::new(Players::MarketValue).big_integer())
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_club_id")
                            .from(Players::Table, Players::ClubId)
                            .to(Clubs::Table, Clubs::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_status")
                    .table(Players::Table)
                    .col(Players::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_club_id")
                    .table(Players::Table)
                    .col(Players::ClubId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    FirstName,
    LastName,
    Position,
    Nationality,
    Status,
    ClubId,
    MarketValue,
    CreatedAt,
    UpdatedAt,
}
