//! Creates the `service_requests` table for guest-submitted requests
//! (housekeeping, room service and the like).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceRequests::GuestId).integer().not_null())
                    .col(ColumnDef::new(ServiceRequests::GuestName).text().not_null())
                    .col(
                        ColumnDef::new(ServiceRequests::ServiceType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::PreferredTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_requests_guest_id")
                            .from(ServiceRequests::Table, ServiceRequests::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_requests_guest_preferred_time")
                    .table(ServiceRequests::Table)
                    .col(ServiceRequests::GuestId)
                    .col(ServiceRequests::PreferredTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_requests_guest_preferred_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ServiceRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceRequests {
    Table,
    Id,
    GuestId,
    GuestName,
    ServiceType,
    Description,
    PreferredTime,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
}
