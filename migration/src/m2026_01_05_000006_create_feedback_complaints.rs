//! Creates the `feedback_complaints` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedbackComplaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbackComplaints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedbackComplaints::GuestId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackComplaints::FeedbackType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackComplaints::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackComplaints::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(FeedbackComplaints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_complaints_guest_id")
                            .from(FeedbackComplaints::Table, FeedbackComplaints::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbackComplaints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FeedbackComplaints {
    Table,
    Id,
    GuestId,
    FeedbackType,
    Description,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
}
