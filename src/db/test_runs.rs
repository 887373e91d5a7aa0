//! Database queries for test runs and their nested suite and spec runs.
//!
//! Nested collections are loaded by explicit composition: one query for the
//! runs, one for their suites, one for the suites' specs. Children are then
//! grouped in memory, so the query count never depends on the row count.
//! Loads filter children by parent column or join, never by a list of IDs,
//! so no read statement grows with the number of rows.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::spec_run::{self, ActiveModel as SpecRunActiveModel, Entity as SpecRunEntity};
use crate::entity::suite_run::{
    self, ActiveModel as SuiteRunActiveModel, Entity as SuiteRunEntity,
};
use crate::entity::test_run::{self, ActiveModel as TestRunActiveModel, Entity as TestRunEntity};
use crate::error::{AppError, AppResult};
use crate::models::{SpecRunInput, SuiteRun, SuiteRunInput, TestRun, TestRunInput, TestRunPatch};

use super::DbPool;

/// Upper bound on IDs bound into one `IN (...)` list.
const DELETE_CHUNK_SIZE: usize = 1000;

impl DbPool {
    /// Get every test run with its suite and spec runs, ordered by ID.
    pub async fn find_all_test_runs(&self) -> AppResult<Vec<TestRun>> {
        let runs = TestRunEntity::find()
            .order_by_asc(test_run::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test runs: {}", e)))?;

        load_tree(self.connection(), runs, TreeScope::All).await
    }

    /// Get a single test run with its suite and spec runs.
    pub async fn find_test_run(&self, id: i64) -> AppResult<Option<TestRun>> {
        let run = TestRunEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test run: {}", e)))?;

        match run {
            Some(run) => Ok(load_tree(self.connection(), vec![run], TreeScope::Run(id))
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    /// Insert a test run together with any nested suite and spec runs.
    pub async fn create_test_run(&self, input: TestRunInput) -> AppResult<TestRun> {
        let txn = begin(self).await?;

        let id = match insert_tree(&txn, input).await {
            Ok(id) => id,
            Err(e) => {
                rollback(txn).await;
                return Err(e);
            }
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test run: {}", e)))?;

        info!("Test run created: id={}", id);

        self.find_test_run(id)
            .await?
            .ok_or_else(AppError::test_run_not_found)
    }

    /// Merge a partial update into a stored test run.
    ///
    /// Returns `None` when no test run has this ID. Scalar fields absent from
    /// the patch keep their stored values. When the patch carries suite runs,
    /// the run's suites are reconciled against them (see `reconcile_suites`);
    /// otherwise the stored suites are left alone.
    pub async fn update_test_run(
        &self,
        id: i64,
        patch: TestRunPatch,
    ) -> AppResult<Option<TestRun>> {
        let txn = begin(self).await?;

        // Row lock held until commit; a concurrent delete waits for us.
        let current = match TestRunEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
        {
            Ok(Some(current)) => current,
            Ok(None) => {
                rollback(txn).await;
                return Ok(None);
            }
            Err(e) => {
                rollback(txn).await;
                return Err(AppError::Database(format!("Failed to get test run: {}", e)));
            }
        };

        let merged = patch.merged(&current);
        let scalars_changed = merged != current;

        if !scalars_changed && patch.suite_runs.is_none() {
            rollback(txn).await;
            return self.find_test_run(id).await;
        }

        match apply_update(&txn, merged, scalars_changed, patch.suite_runs).await {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => {
                rollback(txn).await;
                return Ok(None);
            }
            Err(e) => {
                rollback(txn).await;
                return Err(e);
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test run update: {}", e)))?;

        info!("Test run updated: id={}", id);

        self.find_test_run(id).await
    }

    /// Delete a test run and all of its suite and spec runs in one transaction.
    ///
    /// Returns the deleted ID. Fails with `NotFound` when no row was removed;
    /// any store error rolls the transaction back.
    pub async fn delete_test_run(&self, id: i64) -> AppResult<i64> {
        let txn = begin(self).await?;

        match delete_tree(&txn, id).await {
            Ok(0) => {
                rollback(txn).await;
                Err(AppError::test_run_not_found())
            }
            Ok(_) => {
                txn.commit().await.map_err(|e| {
                    AppError::Database(format!("Failed to commit test run delete: {}", e))
                })?;
                info!("Test run deleted: id={}", id);
                Ok(id)
            }
            Err(e) => {
                rollback(txn).await;
                Err(e)
            }
        }
    }
}

async fn begin(pool: &DbPool) -> AppResult<DatabaseTransaction> {
    pool.connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        warn!("Failed to roll back transaction: {}", e);
    }
}

/// Which children `load_tree` has to fetch.
#[derive(Debug, Clone, Copy)]
enum TreeScope {
    /// Every suite and spec in the store.
    All,
    /// Children of one run.
    Run(i64),
}

/// Attach suite and spec runs to the given test run rows.
///
/// Children whose run is not among `runs` (rows inserted between the
/// queries) are dropped.
async fn load_tree<C: ConnectionTrait>(
    conn: &C,
    runs: Vec<test_run::Model>,
    scope: TreeScope,
) -> AppResult<Vec<TestRun>> {
    if runs.is_empty() {
        return Ok(Vec::new());
    }

    let mut suites_query = SuiteRunEntity::find().order_by_asc(suite_run::Column::Id);
    let mut specs_query = SpecRunEntity::find().order_by_asc(spec_run::Column::Id);
    if let TreeScope::Run(run_id) = scope {
        suites_query = suites_query.filter(suite_run::Column::TestRunId.eq(run_id));
        specs_query = specs_query
            .inner_join(SuiteRunEntity)
            .filter(suite_run::Column::TestRunId.eq(run_id));
    }

    let suites = suites_query
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get suite runs: {}", e)))?;

    let specs = if suites.is_empty() {
        Vec::new()
    } else {
        specs_query
            .all(conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get spec runs: {}", e)))?
    };

    let mut specs_by_suite: HashMap<i64, Vec<spec_run::Model>> = HashMap::new();
    for spec in specs {
        specs_by_suite.entry(spec.suite_id).or_default().push(spec);
    }

    let mut suites_by_run: HashMap<i64, Vec<SuiteRun>> = HashMap::new();
    for suite in suites {
        let specs = specs_by_suite.remove(&suite.id).unwrap_or_default();
        suites_by_run
            .entry(suite.test_run_id)
            .or_default()
            .push(SuiteRun::from_parts(suite, specs));
    }

    Ok(runs
        .into_iter()
        .map(|run| {
            let suites = suites_by_run.remove(&run.id).unwrap_or_default();
            TestRun::from_parts(run, suites)
        })
        .collect())
}

async fn insert_tree(txn: &DatabaseTransaction, input: TestRunInput) -> AppResult<i64> {
    let run = TestRunActiveModel {
        test_project_name: Set(input.test_project_name),
        test_seed: Set(input.test_seed),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert test run: {}", e)))?;

    for suite in input.suite_runs {
        insert_suite(txn, run.id, suite).await?;
    }

    Ok(run.id)
}

async fn insert_suite(txn: &DatabaseTransaction, run_id: i64, input: SuiteRunInput) -> AppResult<()> {
    let suite = SuiteRunActiveModel {
        test_run_id: Set(run_id),
        suite_name: Set(input.suite_name),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert suite run: {}", e)))?;

    for spec in input.spec_runs {
        insert_spec(txn, suite.id, spec).await?;
    }

    Ok(())
}

async fn insert_spec(txn: &DatabaseTransaction, suite_id: i64, input: SpecRunInput) -> AppResult<()> {
    SpecRunActiveModel {
        suite_id: Set(suite_id),
        spec_description: Set(input.spec_description),
        status: Set(input.status.as_str().to_string()),
        message: Set(input.message),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert spec run: {}", e)))?;

    Ok(())
}

async fn apply_update(
    txn: &DatabaseTransaction,
    merged: test_run::Model,
    scalars_changed: bool,
    suite_runs: Option<Vec<SuiteRunInput>>,
) -> AppResult<()> {
    let run_id = merged.id;

    if scalars_changed {
        // Whole-row update; unpatched columns carry their stored values.
        TestRunActiveModel {
            id: ActiveValue::Unchanged(merged.id),
            test_project_name: Set(merged.test_project_name),
            test_seed: Set(merged.test_seed),
            start_time: Set(merged.start_time),
            end_time: Set(merged.end_time),
        }
        .update(txn)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::test_run_not_found(),
            e => AppError::Database(format!("Failed to update test run: {}", e)),
        })?;
    }

    if let Some(suites) = suite_runs {
        reconcile_suites(txn, run_id, suites).await?;
    }

    Ok(())
}

/// Make the run's suites match `inputs` exactly.
///
/// Inputs carrying the ID of a suite owned by this run update that suite in
/// place; all other inputs become new suites. Owned suites no input refers
/// to are removed along with their specs.
async fn reconcile_suites(
    txn: &DatabaseTransaction,
    run_id: i64,
    inputs: Vec<SuiteRunInput>,
) -> AppResult<()> {
    let owned: HashSet<i64> = SuiteRunEntity::find()
        .select_only()
        .column(suite_run::Column::Id)
        .filter(suite_run::Column::TestRunId.eq(run_id))
        .into_tuple::<i64>()
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get suite runs: {}", e)))?
        .into_iter()
        .collect();

    let mut kept = HashSet::new();
    for input in inputs {
        match input.id.filter(|id| owned.contains(id) && !kept.contains(id)) {
            Some(suite_id) => {
                kept.insert(suite_id);
                SuiteRunActiveModel {
                    id: ActiveValue::Unchanged(suite_id),
                    test_run_id: ActiveValue::Unchanged(run_id),
                    suite_name: Set(input.suite_name),
                    start_time: Set(input.start_time),
                    end_time: Set(input.end_time),
                }
                .update(txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to update suite run: {}", e)))?;

                reconcile_specs(txn, suite_id, input.spec_runs).await?;
            }
            None => insert_suite(txn, run_id, input).await?,
        }
    }

    let removed: Vec<i64> = owned.difference(&kept).copied().collect();
    for chunk in removed.chunks(DELETE_CHUNK_SIZE) {
        SpecRunEntity::delete_many()
            .filter(spec_run::Column::SuiteId.is_in(chunk.iter().copied()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete spec runs: {}", e)))?;

        SuiteRunEntity::delete_many()
            .filter(suite_run::Column::Id.is_in(chunk.iter().copied()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete suite runs: {}", e)))?;
    }

    Ok(())
}

/// Make a suite's specs match `inputs`, matching by ID like `reconcile_suites`.
async fn reconcile_specs(
    txn: &DatabaseTransaction,
    suite_id: i64,
    inputs: Vec<SpecRunInput>,
) -> AppResult<()> {
    let owned: HashSet<i64> = SpecRunEntity::find()
        .select_only()
        .column(spec_run::Column::Id)
        .filter(spec_run::Column::SuiteId.eq(suite_id))
        .into_tuple::<i64>()
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get spec runs: {}", e)))?
        .into_iter()
        .collect();

    let mut kept = HashSet::new();
    for input in inputs {
        match input.id.filter(|id| owned.contains(id) && !kept.contains(id)) {
            Some(spec_id) => {
                kept.insert(spec_id);
                SpecRunActiveModel {
                    id: ActiveValue::Unchanged(spec_id),
                    suite_id: ActiveValue::Unchanged(suite_id),
                    spec_description: Set(input.spec_description),
                    status: Set(input.status.as_str().to_string()),
                    message: Set(input.message),
                    start_time: Set(input.start_time),
                    end_time: Set(input.end_time),
                }
                .update(txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to update spec run: {}", e)))?;
            }
            None => insert_spec(txn, suite_id, input).await?,
        }
    }

    let removed: Vec<i64> = owned.difference(&kept).copied().collect();
    for chunk in removed.chunks(DELETE_CHUNK_SIZE) {
        SpecRunEntity::delete_many()
            .filter(spec_run::Column::Id.is_in(chunk.iter().copied()))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete spec runs: {}", e)))?;
    }

    Ok(())
}

/// Delete a run's specs, suites and the run row. Returns rows removed from `test_runs`.
async fn delete_tree(txn: &DatabaseTransaction, id: i64) -> AppResult<u64> {
    let suite_ids = SuiteRunEntity::find()
        .select_only()
        .column(suite_run::Column::Id)
        .filter(suite_run::Column::TestRunId.eq(id))
        .into_query();

    SpecRunEntity::delete_many()
        .filter(spec_run::Column::SuiteId.in_subquery(suite_ids))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete spec runs: {}", e)))?;

    SuiteRunEntity::delete_many()
        .filter(suite_run::Column::TestRunId.eq(id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete suite runs: {}", e)))?;

    let result = TestRunEntity::delete_by_id(id)
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete test run: {}", e)))?;

    Ok(result.rows_affected)
}
