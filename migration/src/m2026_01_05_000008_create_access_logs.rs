//! Creates the `access_logs` table recording door access attempts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessLogs::RfidUid).text().not_null())
                    .col(ColumnDef::new(AccessLogs::GuestId).integer().null())
                    .col(ColumnDef::new(AccessLogs::AccessStatus).text().not_null())
                    .col(
                        ColumnDef::new(AccessLogs::DoorUnlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AccessLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_access_logs_guest_timestamp")
                    .table(AccessLogs::Table)
                    .col(AccessLogs::GuestId)
                    .col(AccessLogs::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_access_logs_guest_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AccessLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccessLogs {
    Table,
    Id,
    RfidUid,
    GuestId,
    AccessStatus,
    DoorUnlocked,
    Timestamp,
}
