//! Partial updates of test runs.

use actix_web::test;
use serde_json::{Value, json};

use crate::test_helpers::*;

async fn put<S>(app: &S, id: &str, payload: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send_json(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/testrun/{}", id))
            .insert_header(("content-type", "application/json"))
            .set_payload(payload.to_string()),
    )
    .await
}

#[actix_rt::test]
async fn test_update_name_only_keeps_other_fields() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("before")).await;
    let id = created["ID"].to_string();

    let (status, body) = put(&app, &id, r#"{"TestProjectName":"after"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(body["TestProjectName"], "after");
    assert_eq!(body["TestSeed"], created["TestSeed"]);
    assert_eq!(body["StartTime"], created["StartTime"]);
    assert_eq!(body["EndTime"], created["EndTime"]);
    assert_eq!(body["SuiteRuns"], created["SuiteRuns"]);

    let (_, stored) = get_test_run(&app, &id).await;
    assert_eq!(stored, body);
}

#[actix_rt::test]
async fn test_update_is_idempotent() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("twice")).await;
    let id = created["ID"].to_string();
    let patch = r#"{"TestSeed":99,"EndTime":"2024-03-01T11:00:00Z"}"#;

    let (_, once) = put(&app, &id, patch).await;
    let (status, again) = put(&app, &id, patch).await;

    assert_eq!(status, 200);
    assert_eq!(once, again);
    assert_eq!(again["TestSeed"], 99);
    assert_eq!(again["EndTime"], "2024-03-01T11:00:00Z");
}

#[actix_rt::test]
async fn test_update_with_only_unknown_keys_changes_nothing() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("unchanged")).await;
    let id = created["ID"].to_string();

    let (status, body) = put(&app, &id, r#"{"InvalidField":"x","ID":12345}"#).await;

    assert_eq!(status, 200);
    assert_eq!(body, created);
}

#[actix_rt::test]
async fn test_update_with_undecodable_body_changes_nothing() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("garbage")).await;
    let id = created["ID"].to_string();

    let (status, body) = put(&app, &id, "not json at all").await;
    assert_eq!(status, 200);
    assert_eq!(body, created);

    let (status, body) = put(&app, &id, "").await;
    assert_eq!(status, 200);
    assert_eq!(body, created);
}

#[actix_rt::test]
async fn test_update_missing_run_is_not_found() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    for payload in [r#"{"TestProjectName":"x"}"#, r#"{"InvalidField":1}"#, "nonsense"] {
        let (status, body) = put(&app, "4040", payload).await;
        assert_eq!(status, 404, "payload {:?}", payload);
        assert_eq!(body["error"], "test run not found");
    }

    let (status, _) = put(&app, "invalidID", r#"{"TestProjectName":"x"}"#).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_update_reconciles_suites_by_id() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let mut payload = sample_test_run("nested");
    payload["SuiteRuns"]
        .as_array_mut()
        .expect("suites")
        .push(json!({
            "SuiteName": "Search",
            "StartTime": "2024-03-01T10:02:30Z",
            "EndTime": "2024-03-01T10:05:00Z",
            "SpecRuns": []
        }));
    let created = create_test_run(&app, payload).await;
    let id = created["ID"].to_string();
    let checkout = &created["SuiteRuns"][0];
    let search_id = created["SuiteRuns"][1]["ID"].clone();
    let kept_spec = &checkout["SpecRuns"][0];

    // Keep "Checkout" with only its first spec (now skipped), drop "Search", add "Profile".
    let patch = json!({
        "SuiteRuns": [
            {
                "ID": checkout["ID"],
                "SuiteName": "Checkout (retried)",
                "StartTime": checkout["StartTime"],
                "EndTime": checkout["EndTime"],
                "SpecRuns": [{
                    "ID": kept_spec["ID"],
                    "SpecDescription": kept_spec["SpecDescription"],
                    "Status": "Skipped",
                    "StartTime": kept_spec["StartTime"],
                    "EndTime": kept_spec["EndTime"]
                }]
            },
            {
                "SuiteName": "Profile",
                "StartTime": "2024-03-01T10:03:00Z",
                "EndTime": "2024-03-01T10:04:00Z"
            }
        ]
    });

    let (status, body) = put(&app, &id, &patch.to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body["TestProjectName"], "nested");

    let suites = body["SuiteRuns"].as_array().expect("suites");
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0]["ID"], checkout["ID"]);
    assert_eq!(suites[0]["SuiteName"], "Checkout (retried)");
    assert_eq!(suites[0]["SpecRuns"].as_array().map(Vec::len), Some(1));
    assert_eq!(suites[0]["SpecRuns"][0]["ID"], kept_spec["ID"]);
    assert_eq!(suites[0]["SpecRuns"][0]["Status"], "Skipped");
    assert_eq!(suites[1]["SuiteName"], "Profile");
    assert!(suites.iter().all(|s| s["ID"] != search_id));

    // Same patch again: matched IDs stay, the ID-less "Profile" is replaced.
    let (status, again) = put(&app, &id, &patch.to_string()).await;
    assert_eq!(status, 200);
    let suites = again["SuiteRuns"].as_array().expect("suites");
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0], body["SuiteRuns"][0]);
}

#[actix_rt::test]
async fn test_update_ignores_suite_ids_from_other_runs() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let owner = create_test_run(&app, sample_test_run("owner")).await;
    let other = create_test_run(&app, json!({ "TestProjectName": "other" })).await;
    let foreign_suite = owner["SuiteRuns"][0]["ID"].clone();

    let patch = json!({
        "SuiteRuns": [{ "ID": foreign_suite, "SuiteName": "Stolen" }]
    });
    let (status, body) = put(&app, &other["ID"].to_string(), &patch.to_string()).await;

    assert_eq!(status, 200);
    assert_eq!(body["SuiteRuns"][0]["SuiteName"], "Stolen");
    assert_ne!(body["SuiteRuns"][0]["ID"], foreign_suite);

    let (_, untouched) = get_test_run(&app, &owner["ID"].to_string()).await;
    assert_eq!(untouched, owner);
}

#[actix_rt::test]
async fn test_update_accepts_snake_case_keys() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("snake-before")).await;
    let id = created["ID"].to_string();

    let (status, body) = put(&app, &id, r#"{"test_project_name":"snake-after"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(body["TestProjectName"], "snake-after");
    assert_eq!(body["StartTime"], created["StartTime"]);
    assert_eq!(body["SuiteRuns"], created["SuiteRuns"]);
}
