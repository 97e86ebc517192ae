//! Creates the `rooms` table.
//!
//! Rooms cycle `available -> reserved -> occupied -> available`, with
//! `maintenance` as an operator-controlled side state.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::RoomNumber)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .text()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Rooms::GuestId).integer().null())
                    .col(ColumnDef::new(Rooms::HoursStay).double().null())
                    .col(
                        ColumnDef::new(Rooms::RegistrationTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CheckIn)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CheckOut)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_guest_id")
                            .from(Rooms::Table, Rooms::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Room auto-detection and the checkout sweep both filter on these
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_guest_status")
                    .table(Rooms::Table)
                    .col(Rooms::GuestId)
                    .col(Rooms::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_status_check_out")
                    .table(Rooms::Table)
                    .col(Rooms::Status)
                    .col(Rooms::CheckOut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rooms_guest_status").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_rooms_status_check_out").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    RoomNumber,
    Status,
    GuestId,
    HoursStay,
    RegistrationTime,
    CheckIn,
    CheckOut,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
}
