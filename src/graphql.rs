//! GraphQL schema over the test run data-access operations.
//!
//! Resolvers share `DbPool` with the REST handlers and report the same
//! errors: a missing or malformed ID yields `test run not found`.

use actix_web::{HttpResponse, get, web};
use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptySubscription, ID, Object, Schema};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::api::test_runs::parse_test_run_id;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{TestRun, TestRunInput, TestRunPatch};

/// Path the GraphQL endpoint is served from.
pub const GRAPHQL_PATH: &str = "/query";

pub type FernSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the given pool as context data.
pub fn build_schema(pool: DbPool) -> FernSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(pool)
        .finish()
}

fn gql_error(err: AppError) -> async_graphql::Error {
    if let AppError::Database(ref detail) = err {
        tracing::error!("Database error: {}", detail);
    }
    async_graphql::Error::new(err.public_message())
}

fn parse_id(id: &ID) -> async_graphql::Result<i64> {
    parse_test_run_id(id.as_str()).map_err(gql_error)
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Every test run with its suite and spec runs.
    async fn test_runs(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TestRun>> {
        let pool = ctx.data::<DbPool>()?;
        pool.find_all_test_runs().await.map_err(gql_error)
    }

    /// One test run by ID.
    async fn test_run(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<TestRun> {
        let pool = ctx.data::<DbPool>()?;
        let id = parse_id(&id)?;
        pool.find_test_run(id)
            .await
            .map_err(gql_error)?
            .ok_or_else(|| gql_error(AppError::test_run_not_found()))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_test_run(
        &self,
        ctx: &Context<'_>,
        input: TestRunInput,
    ) -> async_graphql::Result<TestRun> {
        let pool = ctx.data::<DbPool>()?;
        pool.create_test_run(input).await.map_err(gql_error)
    }

    /// Apply a partial update; omitted fields keep their stored values.
    async fn update_test_run(
        &self,
        ctx: &Context<'_>,
        id: ID,
        patch: TestRunPatch,
    ) -> async_graphql::Result<TestRun> {
        let pool = ctx.data::<DbPool>()?;
        let id = parse_id(&id)?;
        pool.update_test_run(id, patch)
            .await
            .map_err(gql_error)?
            .ok_or_else(|| gql_error(AppError::test_run_not_found()))
    }

    /// Delete a test run and its children; returns the deleted ID.
    async fn delete_test_run(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ID> {
        let pool = ctx.data::<DbPool>()?;
        let id = parse_id(&id)?;
        let deleted = pool.delete_test_run(id).await.map_err(gql_error)?;
        Ok(ID::from(deleted.to_string()))
    }
}

async fn graphql_handler(schema: web::Data<FernSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// GraphiQL playground page pointed at the GraphQL endpoint.
#[get("/_graphql")]
pub async fn playground() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// Configure the GraphQL endpoint. Expects `web::Data<FernSchema>` in app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(GRAPHQL_PATH).route(web::post().to(graphql_handler)));
}
