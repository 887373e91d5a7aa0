//! Domain models for the reporter API.

pub mod test_run;

// Re-export commonly used types
pub use test_run::{
    DeletedTestRun, SpecRun, SpecRunInput, SpecStatus, SuiteRun, SuiteRunInput, TestRun,
    TestRunInput, TestRunPatch,
};
