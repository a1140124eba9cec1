//! Test results and the run summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::step::StepInfo;

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    /// Not run because an earlier mandatory step failed
    Skipped,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        })
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub step_name: String,
    pub status: TestStatus,
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall time spent in the step
    #[serde(default)]
    pub duration_ms: u64,
}

impl TestResult {
    pub(crate) fn succeeded(info: StepInfo, duration_ms: u64) -> Self {
        Self::from_info(info, TestStatus::Passed, None, duration_ms)
    }

    pub(crate) fn failed(info: StepInfo, message: String, duration_ms: u64) -> Self {
        Self::from_info(info, TestStatus::Failed, Some(message), duration_ms)
    }

    pub(crate) fn skipped(info: StepInfo) -> Self {
        Self::from_info(info, TestStatus::Skipped, None, 0)
    }

    fn from_info(
        info: StepInfo,
        status: TestStatus,
        error_message: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            step_name: info.name,
            status,
            mandatory: info.mandatory,
            description: info.description,
            error_message,
            duration_ms,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Overall connection status as reported to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Successful,
    Failed,
}

/// Ordered step results of one connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestSummary {
    pub results: Vec<TestResult>,
    /// False iff a mandatory step did not pass
    pub success: bool,
}

impl ConnectionTestSummary {
    pub fn new(results: Vec<TestResult>) -> Self {
        let success = results
            .iter()
            .filter(|r| r.mandatory)
            .all(TestResult::passed);
        Self { results, success }
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.success {
            ConnectionStatus::Successful
        } else {
            ConnectionStatus::Failed
        }
    }

    /// Result for a step by name.
    pub fn result(&self, step_name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.step_name == step_name)
    }

    pub fn status_of(&self, step_name: &str) -> Option<TestStatus> {
        self.result(step_name).map(|r| r.status)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
    }
}

impl fmt::Display for ConnectionTestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connection test: {:?}", self.status())?;
        for result in &self.results {
            write!(f, "  [{}] {}", result.status, result.step_name)?;
            if result.mandatory {
                write!(f, " (mandatory)")?;
            }
            if let Some(message) = &result.error_message {
                write!(f, ": {message}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
