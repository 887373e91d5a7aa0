//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fern Reporter Server",
        version = "0.1.0",
        description = "API server for recording test runs and viewing test run reports"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Test run endpoints
        api::test_runs::list_test_runs,
        api::test_runs::get_test_run,
        api::test_runs::create_test_run,
        api::test_runs::update_test_run,
        api::test_runs::delete_test_run,
        // Report endpoints
        api::reports::report_all_test_runs,
        api::reports::report_test_run,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::ServiceStatus,
            // Test runs
            models::TestRun,
            models::SuiteRun,
            models::SpecRun,
            models::TestRunInput,
            models::SuiteRunInput,
            models::SpecRunInput,
            models::TestRunPatch,
            models::DeletedTestRun,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Test Runs", description = "Test run CRUD"),
        (name = "Reports", description = "Rendered HTML reports")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
