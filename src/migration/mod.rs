//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_test_runs;
mod m20240301_000002_create_suite_runs;
mod m20240301_000003_create_spec_runs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_test_runs::Migration),
            Box::new(m20240301_000002_create_suite_runs::Migration),
            Box::new(m20240301_000003_create_spec_runs::Migration),
        ]
    }
}
