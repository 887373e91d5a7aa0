//! Test run, suite run and spec run models as exchanged over the API.
//!
//! Field names on the wire keep the casing existing reporter clients send
//! and expect (`ID`, `TestProjectName`, ...). Input payloads also accept the
//! snake_case spelling of every field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{spec_run, suite_run, test_run};

/// Outcome of a single spec run.
///
/// Reporters are free to send labels beyond the three known outcomes; those
/// are kept verbatim in `Other` and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpecStatus {
    Passed,
    Failed,
    Skipped,
    Other(String),
}

async_graphql::scalar!(
    SpecStatus,
    "SpecStatus",
    "Outcome label of a spec run: Passed, Failed, Skipped or any other label."
);

impl SpecStatus {
    /// Convert to database string representation.
    ///
    /// Known outcomes are stored lowercase; other labels as sent.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Other(label) => label,
        }
    }

    /// Label shown to API clients.
    pub fn label(&self) -> &str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Skipped => "Skipped",
            Self::Other(label) => label,
        }
    }

    /// Parse a stored or client-supplied label; known outcomes match case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for SpecStatus {
    fn from(s: String) -> Self {
        SpecStatus::parse(&s)
    }
}

impl From<SpecStatus> for String {
    fn from(status: SpecStatus) -> Self {
        status.label().to_string()
    }
}

impl std::fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One test run with its suite runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, async_graphql::SimpleObject)]
pub struct TestRun {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "TestProjectName", alias = "test_project_name")]
    pub test_project_name: String,
    #[serde(rename = "TestSeed", alias = "test_seed")]
    pub test_seed: i64,
    #[serde(rename = "StartTime", alias = "start_time")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "SuiteRuns", alias = "suite_runs", default)]
    pub suite_runs: Vec<SuiteRun>,
}

/// One suite execution within a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, async_graphql::SimpleObject)]
pub struct SuiteRun {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "TestRunID", alias = "test_run_id")]
    pub test_run_id: i64,
    #[serde(rename = "SuiteName", alias = "suite_name")]
    pub suite_name: String,
    #[serde(rename = "StartTime", alias = "start_time")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "SpecRuns", alias = "spec_runs", default)]
    pub spec_runs: Vec<SpecRun>,
}

/// One test case execution within a suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, async_graphql::SimpleObject)]
pub struct SpecRun {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "SuiteID", alias = "suite_id")]
    pub suite_id: i64,
    #[serde(rename = "SpecDescription", alias = "spec_description")]
    pub spec_description: String,
    #[serde(rename = "Status", alias = "status")]
    #[schema(value_type = String, example = "Passed")]
    pub status: SpecStatus,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "StartTime", alias = "start_time")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time")]
    pub end_time: DateTime<Utc>,
}

impl TestRun {
    /// Assemble a test run from its row and already-assembled suite runs.
    pub fn from_parts(run: test_run::Model, suite_runs: Vec<SuiteRun>) -> Self {
        TestRun {
            id: run.id,
            test_project_name: run.test_project_name,
            test_seed: run.test_seed,
            start_time: run.start_time,
            end_time: run.end_time,
            suite_runs,
        }
    }

    /// Total number of spec runs across all suites.
    pub fn spec_count(&self) -> usize {
        self.suite_runs.iter().map(|s| s.spec_runs.len()).sum()
    }
}

impl SuiteRun {
    /// Assemble a suite run from its row and its spec rows.
    pub fn from_parts(suite: suite_run::Model, specs: Vec<spec_run::Model>) -> Self {
        SuiteRun {
            id: suite.id,
            test_run_id: suite.test_run_id,
            suite_name: suite.suite_name,
            start_time: suite.start_time,
            end_time: suite.end_time,
            spec_runs: specs.into_iter().map(SpecRun::from).collect(),
        }
    }
}

impl From<spec_run::Model> for SpecRun {
    fn from(m: spec_run::Model) -> Self {
        SpecRun {
            id: m.id,
            suite_id: m.suite_id,
            spec_description: m.spec_description,
            status: SpecStatus::parse(&m.status),
            message: m.message,
            start_time: m.start_time,
            end_time: m.end_time,
        }
    }
}

/// Request body for creating a test run.
///
/// Missing scalar fields fall back to empty/zero values.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, async_graphql::InputObject)]
pub struct TestRunInput {
    #[serde(rename = "TestProjectName", alias = "test_project_name", default)]
    #[graphql(default)]
    pub test_project_name: String,
    #[serde(rename = "TestSeed", alias = "test_seed", default)]
    #[graphql(default)]
    pub test_seed: i64,
    #[serde(rename = "StartTime", alias = "start_time", default)]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time", default)]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "SuiteRuns", alias = "suite_runs", default)]
    #[graphql(default)]
    pub suite_runs: Vec<SuiteRunInput>,
}

/// Suite run as supplied in a create or update payload.
///
/// `id` is only consulted on update, to keep an existing suite's identity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema, async_graphql::InputObject)]
pub struct SuiteRunInput {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(rename = "SuiteName", alias = "suite_name", default)]
    #[graphql(default)]
    pub suite_name: String,
    #[serde(rename = "StartTime", alias = "start_time", default)]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time", default)]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "SpecRuns", alias = "spec_runs", default)]
    #[graphql(default)]
    pub spec_runs: Vec<SpecRunInput>,
}

/// Spec run as supplied in a create or update payload.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, async_graphql::InputObject)]
pub struct SpecRunInput {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(rename = "SpecDescription", alias = "spec_description", default)]
    #[graphql(default)]
    pub spec_description: String,
    #[serde(rename = "Status", alias = "status")]
    #[schema(value_type = String, example = "Passed")]
    pub status: SpecStatus,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "StartTime", alias = "start_time", default)]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "EndTime", alias = "end_time", default)]
    pub end_time: DateTime<Utc>,
}

/// Partial update for a test run.
///
/// Absent fields leave the stored value untouched. Keys that are not listed
/// here (including `ID`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema, async_graphql::InputObject)]
pub struct TestRunPatch {
    #[serde(rename = "TestProjectName", alias = "test_project_name", default)]
    pub test_project_name: Option<String>,
    #[serde(rename = "TestSeed", alias = "test_seed", default)]
    pub test_seed: Option<i64>,
    #[serde(rename = "StartTime", alias = "start_time", default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "EndTime", alias = "end_time", default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "SuiteRuns", alias = "suite_runs", default)]
    pub suite_runs: Option<Vec<SuiteRunInput>>,
}

impl TestRunPatch {
    /// Decode a patch body, treating anything undecodable as an empty patch.
    pub fn from_body_lenient(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        match serde_json::from_slice(body) {
            Ok(patch) => patch,
            Err(e) => {
                tracing::debug!("Ignoring undecodable test run patch: {}", e);
                Self::default()
            }
        }
    }

    /// Apply the scalar fields of this patch to a stored row.
    pub fn merged(&self, current: &test_run::Model) -> test_run::Model {
        test_run::Model {
            id: current.id,
            test_project_name: self
                .test_project_name
                .clone()
                .unwrap_or_else(|| current.test_project_name.clone()),
            test_seed: self.test_seed.unwrap_or(current.test_seed),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
        }
    }
}

/// Response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletedTestRun {
    #[serde(rename = "ID")]
    pub id: i64,
}
