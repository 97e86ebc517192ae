//! Creates the `guests` table holding guest identity and membership data.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Guests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Guests::Name).text().not_null())
                    .col(ColumnDef::new(Guests::Email).text().not_null().unique_key())
                    .col(ColumnDef::new(Guests::Phone).text().not_null())
                    .col(ColumnDef::new(Guests::PasswordHash).text().not_null())
                    .col(
                        ColumnDef::new(Guests::MembershipLevel)
                            .text()
                            .not_null()
                            .default("Regular"),
                    )
                    .col(
                        ColumnDef::new(Guests::MembershipStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Guests::MembershipRenewals)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Guests::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(Guests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Login by phone scans this column
        manager
            .create_index(
                Index::create()
                    .name("idx_guests_phone")
                    .table(Guests::Table)
                    .col(Guests::Phone)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_guests_phone").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Guests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    Name,
    Email,
    Phone,
    PasswordHash,
    MembershipLevel,
    MembershipStart,
    MembershipRenewals,
    AvatarUrl,
    CreatedAt,
}
