//! GraphQL endpoint and playground.

use actix_web::test;
use serde_json::{Value, json};

use crate::test_helpers::*;

async fn graphql<S>(app: &S, query: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send_json(
        app,
        test::TestRequest::post()
            .uri("/query")
            .set_json(json!({ "query": query })),
    )
    .await;
    assert_eq!(status, 200, "GraphQL transport should succeed: {}", body);
    body
}

const CREATE: &str = r#"
    mutation {
        createTestRun(input: {
            testProjectName: "gql-run"
            testSeed: 5
            startTime: "2024-03-01T10:00:00Z"
            endTime: "2024-03-01T10:01:00Z"
            suiteRuns: [{
                suiteName: "Login"
                startTime: "2024-03-01T10:00:00Z"
                endTime: "2024-03-01T10:01:00Z"
                specRuns: [{
                    specDescription: "logs in"
                    status: "Passed"
                    startTime: "2024-03-01T10:00:00Z"
                    endTime: "2024-03-01T10:00:02Z"
                }]
            }]
        }) {
            id
            testProjectName
            suiteRuns { id suiteName specRuns { id status } }
        }
    }
"#;

#[actix_rt::test]
async fn test_graphql_create_and_query() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = graphql(&app, CREATE).await;
    assert!(created.get("errors").is_none(), "{}", created);
    let run = &created["data"]["createTestRun"];
    assert_eq!(run["testProjectName"], "gql-run");
    assert_eq!(run["suiteRuns"][0]["specRuns"][0]["status"], "Passed");
    let id = run["id"].as_i64().expect("id");

    let listed = graphql(&app, "{ testRuns { id testProjectName } }").await;
    assert_eq!(listed["data"]["testRuns"][0]["id"], id);

    // Visible over REST too.
    let (status, body) = get_test_run(&app, &id.to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body["TestProjectName"], "gql-run");
}

#[actix_rt::test]
async fn test_graphql_update_and_delete() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let created = create_test_run(&app, sample_test_run("rest-run")).await;
    let id = created["ID"].as_i64().expect("ID");

    let updated = graphql(
        &app,
        &format!(
            r#"mutation {{ updateTestRun(id: "{}", patch: {{ testSeed: 77 }}) {{ testProjectName testSeed }} }}"#,
            id
        ),
    )
    .await;
    assert_eq!(updated["data"]["updateTestRun"]["testSeed"], 77);
    assert_eq!(updated["data"]["updateTestRun"]["testProjectName"], "rest-run");

    let deleted = graphql(
        &app,
        &format!(r#"mutation {{ deleteTestRun(id: "{}") }}"#, id),
    )
    .await;
    assert_eq!(deleted["data"]["deleteTestRun"], id.to_string());

    let again = graphql(
        &app,
        &format!(r#"mutation {{ deleteTestRun(id: "{}") }}"#, id),
    )
    .await;
    assert_eq!(again["errors"][0]["message"], "test run not found");
}

#[actix_rt::test]
async fn test_graphql_missing_and_malformed_ids() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let missing = graphql(&app, r#"{ testRun(id: "9") { id } }"#).await;
    assert_eq!(missing["errors"][0]["message"], "test run not found");

    let malformed = graphql(&app, r#"{ testRun(id: "invalidID") { id } }"#).await;
    assert_eq!(malformed["errors"][0]["message"], "test run not found");
}

#[actix_rt::test]
async fn test_playground_is_served() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/testrun/_graphql")).await;
    assert_eq!(status, 200);
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("/query"));
}
