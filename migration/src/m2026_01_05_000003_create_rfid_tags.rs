//! Creates the `rfid_tags` table.
//!
//! A tag moves `available -> assigned -> active` and may be marked `lost`.
//! Status changes are applied through conditional updates keyed on the
//! current status, so the status column is indexed together with the owner.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RfidTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RfidTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RfidTags::RfidUid)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RfidTags::Status)
                            .text()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(RfidTags::GuestId).integer().null())
                    .col(
                        ColumnDef::new(RfidTags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RfidTags::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rfid_tags_guest_id")
                            .from(RfidTags::Table, RfidTags::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rfid_tags_guest_status")
                    .table(RfidTags::Table)
                    .col(RfidTags::GuestId)
                    .col(RfidTags::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rfid_tags_guest_status").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RfidTags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RfidTags {
    Table,
    Id,
    RfidUid,
    Status,
    GuestId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
}
