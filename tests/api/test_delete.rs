//! Deleting test runs.

use actix_web::test;
use sea_orm::ConnectionTrait;
use serde_json::{Value, json};

use crate::test_helpers::*;

async fn delete<S>(app: &S, id: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send_json(
        app,
        test::TestRequest::delete().uri(&format!("/api/testrun/{}", id)),
    )
    .await
}

#[actix_rt::test]
async fn test_delete_removes_run_and_children() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let doomed = create_test_run(&app, sample_test_run("doomed")).await;
    let survivor = create_test_run(&app, sample_test_run("survivor")).await;
    let id = doomed["ID"].as_i64().expect("ID");

    let (status, body) = delete(&app, &id.to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "ID": id }));

    let (status, _) = get_test_run(&app, &id.to_string()).await;
    assert_eq!(status, 404);

    let (_, list) = send_json(&app, test::TestRequest::get().uri("/api/testrun/")).await;
    assert_eq!(list, json!([survivor]));

    let orphans = pool
        .connection()
        .query_one_raw(sea_orm::Statement::from_string(
            pool.connection().get_database_backend(),
            "SELECT COUNT(*) AS n FROM spec_runs".to_owned(),
        ))
        .await
        .expect("count query")
        .expect("count row");
    let remaining: i64 = orphans.try_get("", "n").expect("count value");
    assert_eq!(remaining, 2, "only the survivor's specs remain");
}

#[actix_rt::test]
async fn test_delete_twice_is_not_found() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("once")).await;
    let id = created["ID"].to_string();

    let (status, _) = delete(&app, &id).await;
    assert_eq!(status, 200);

    let (status, body) = delete(&app, &id).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "test run not found" }));
}

#[actix_rt::test]
async fn test_delete_missing_and_malformed_ids() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = delete(&app, "123").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "test run not found" }));

    let (status, body) = delete(&app, "invalidID").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "test run not found" }));
}

#[actix_rt::test]
async fn test_delete_store_failure_rolls_back() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("protected")).await;
    let id = created["ID"].to_string();

    pool.connection()
        .execute_unprepared(
            "CREATE TRIGGER fail_test_run_delete BEFORE DELETE ON test_runs \
             BEGIN SELECT RAISE(ABORT, 'simulated store failure'); END;",
        )
        .await
        .expect("create trigger");

    let (status, body) = delete(&app, &id).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "internal database error" }));

    // Suites and specs deleted before the failing statement are restored.
    let (status, stored) = get_test_run(&app, &id).await;
    assert_eq!(status, 200);
    assert_eq!(stored, created);
}
