//! Creates the `mac_addresses` table backing the Wi-Fi whitelist.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MacAddresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacAddresses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MacAddresses::Mac).text().not_null())
                    .col(ColumnDef::new(MacAddresses::Ip).text().null())
                    .col(ColumnDef::new(MacAddresses::GuestId).integer().null())
                    .col(ColumnDef::new(MacAddresses::RfidUid).text().null())
                    .col(
                        ColumnDef::new(MacAddresses::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MacAddresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mac_addresses_mac")
                    .table(MacAddresses::Table)
                    .col(MacAddresses::Mac)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_mac_addresses_mac").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MacAddresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MacAddresses {
    Table,
    Id,
    Mac,
    Ip,
    GuestId,
    RfidUid,
    Status,
    CreatedAt,
}
