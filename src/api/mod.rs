//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod reports;
pub mod test_runs;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use reports::configure_report_routes;
pub use test_runs::configure_routes as configure_test_run_routes;

use actix_web::web;

/// Register every REST, report and GraphQL route on an app.
pub fn configure_all(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_test_run_routes)
        .configure(configure_report_routes)
        .configure(crate::graphql::configure_routes)
        .service(openapi::openapi_json);
}
