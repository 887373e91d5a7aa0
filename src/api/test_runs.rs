//! Test run CRUD endpoints.
//!
//! Identifiers that do not parse as integers are reported as not found,
//! the same as identifiers with no matching row.

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::debug;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{DeletedTestRun, TestRun, TestRunInput, TestRunPatch};

/// Configure test run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/testrun")
            .service(list_test_runs)
            .service(create_test_run)
            // Must precede `/{id}`
            .service(crate::graphql::playground)
            .service(get_test_run)
            .service(update_test_run)
            .service(delete_test_run),
    );
}

/// Parse a path identifier; anything non-numeric is treated as not found.
pub fn parse_test_run_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>().map_err(|_| {
        debug!("Malformed test run id: {:?}", raw);
        AppError::test_run_not_found()
    })
}

/// List all test runs.
#[utoipa::path(
    get,
    path = "/api/testrun/",
    tag = "Test Runs",
    responses(
        (status = 200, description = "All test runs with suite and spec runs", body = Vec<TestRun>),
        (status = 500, description = "Database error", body = crate::error::ErrorResponse)
    )
)]
#[get("/")]
pub async fn list_test_runs(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let runs = pool.find_all_test_runs().await?;
    Ok(HttpResponse::Ok().json(runs))
}

/// Get a test run by ID.
#[utoipa::path(
    get,
    path = "/api/testrun/{id}",
    tag = "Test Runs",
    params(
        ("id" = String, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Test run", body = TestRun),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/{id}")]
pub async fn get_test_run(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_test_run_id(&path.into_inner())?;

    let run = pool
        .find_test_run(id)
        .await?
        .ok_or_else(AppError::test_run_not_found)?;

    Ok(HttpResponse::Ok().json(run))
}

/// Create a test run, including any nested suite and spec runs.
#[utoipa::path(
    post,
    path = "/api/testrun/",
    tag = "Test Runs",
    request_body = TestRunInput,
    responses(
        (status = 201, description = "Test run created", body = TestRun),
        (status = 400, description = "Malformed JSON body", body = crate::error::ErrorResponse)
    )
)]
#[post("/")]
pub async fn create_test_run(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let input: TestRunInput = serde_json::from_slice(&body)?;
    let run = pool.create_test_run(input).await?;

    Ok(HttpResponse::Created().json(run))
}

/// Partially update a test run.
///
/// Only fields present in the body are applied. Unknown keys are ignored,
/// and a body that is not a JSON object leaves the record unchanged.
#[utoipa::path(
    put,
    path = "/api/testrun/{id}",
    tag = "Test Runs",
    params(
        ("id" = String, Path, description = "Test run ID")
    ),
    request_body = TestRunPatch,
    responses(
        (status = 200, description = "Merged test run", body = TestRun),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[put("/{id}")]
pub async fn update_test_run(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let id = parse_test_run_id(&path.into_inner())?;
    let patch = TestRunPatch::from_body_lenient(&body);

    let run = pool
        .update_test_run(id, patch)
        .await?
        .ok_or_else(AppError::test_run_not_found)?;

    Ok(HttpResponse::Ok().json(run))
}

/// Delete a test run and its suite and spec runs.
#[utoipa::path(
    delete,
    path = "/api/testrun/{id}",
    tag = "Test Runs",
    params(
        ("id" = String, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Test run deleted", body = DeletedTestRun),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Database error, nothing deleted", body = crate::error::ErrorResponse)
    )
)]
#[delete("/{id}")]
pub async fn delete_test_run(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_test_run_id(&path.into_inner())?;
    let id = pool.delete_test_run(id).await?;

    Ok(HttpResponse::Ok().json(DeletedTestRun { id }))
}
