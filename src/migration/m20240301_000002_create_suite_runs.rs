//! Create suite_runs table.

use sea_orm_migration::prelude::*;

use super::m20240301_000001_create_test_runs::TestRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SuiteRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuiteRuns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuiteRuns::TestRunId).big_integer().not_null())
                    .col(
                        ColumnDef::new(SuiteRuns::SuiteName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SuiteRuns::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SuiteRuns::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suite_runs_test_run_id")
                            .from(SuiteRuns::Table, SuiteRuns::TestRunId)
                            .to(TestRuns::Table, TestRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_suite_runs_test_run_id")
                    .table(SuiteRuns::Table)
                    .col(SuiteRuns::TestRunId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuiteRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SuiteRuns {
    Table,
    Id,
    TestRunId,
    SuiteName,
    StartTime,
    EndTime,
}
