//! Create spec_runs table.

use sea_orm_migration::prelude::*;

use super::m20240301_000002_create_suite_runs::SuiteRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SpecRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SpecRuns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SpecRuns::SuiteId).big_integer().not_null())
                    .col(
                        ColumnDef::new(SpecRuns::SpecDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    // passed, failed, skipped
                    .col(ColumnDef::new(SpecRuns::Status).string_len(32).not_null())
                    .col(ColumnDef::new(SpecRuns::Message).text())
                    .col(
                        ColumnDef::new(SpecRuns::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SpecRuns::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spec_runs_suite_id")
                            .from(SpecRuns::Table, SpecRuns::SuiteId)
                            .to(SuiteRuns::Table, SuiteRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_spec_runs_suite_id")
                    .table(SpecRuns::Table)
                    .col(SpecRuns::SuiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SpecRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SpecRuns {
    Table,
    Id,
    SuiteId,
    SpecDescription,
    Status,
    Message,
    StartTime,
    EndTime,
}
