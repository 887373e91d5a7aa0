//! SuiteRun entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "suite_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub test_run_id: i64,
    pub suite_name: String,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_run::Entity",
        from = "Column::TestRunId",
        to = "super::test_run::Column::Id",
        on_delete = "Cascade"
    )]
    TestRun,
    #[sea_orm(has_many = "super::spec_run::Entity")]
    SpecRuns,
}

impl Related<super::test_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestRun.def()
    }
}

impl Related<super::spec_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpecRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
