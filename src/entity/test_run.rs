//! TestRun entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub test_project_name: String,
    pub test_seed: i64,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::suite_run::Entity")]
    SuiteRuns,
}

impl Related<super::suite_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SuiteRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
