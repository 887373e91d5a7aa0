//! SpecRun entity representing a single test case execution.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "spec_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub suite_id: i64,
    pub spec_description: String,
    /// Free-form label; known outcomes stored lowercase, see `models::SpecStatus`.
    pub status: String,
    pub message: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suite_run::Entity",
        from = "Column::SuiteId",
        to = "super::suite_run::Column::Id",
        on_delete = "Cascade"
    )]
    SuiteRun,
}

impl Related<super::suite_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SuiteRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
