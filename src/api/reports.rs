//! HTML report endpoints.

use actix_web::{HttpResponse, get, web};

use crate::api::test_runs::parse_test_run_id;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::report_view;

/// Configure report routes.
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports/testruns")
            .service(report_all_test_runs)
            .service(report_test_run),
    );
}

/// Render every test run as an HTML page.
#[utoipa::path(
    get,
    path = "/reports/testruns/",
    tag = "Reports",
    responses(
        (status = 200, description = "HTML report of all test runs", content_type = "text/html")
    )
)]
#[get("/")]
pub async fn report_all_test_runs(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let runs = pool.find_all_test_runs().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(report_view::render_test_runs(&runs)))
}

/// Render one test run with its suites and specs as an HTML page.
#[utoipa::path(
    get,
    path = "/reports/testruns/{id}",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "HTML report of one test run", content_type = "text/html"),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/{id}")]
pub async fn report_test_run(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_test_run_id(&path.into_inner())?;

    let run = pool
        .find_test_run(id)
        .await?
        .ok_or_else(AppError::test_run_not_found)?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(report_view::render_test_run(&run)))
}
