//! The scaffold wrapped around candidate code.
//!
//! The script is fixed; everything run-specific travels as one JSON document
//! on the interpreter's stdin, so candidate text is never spliced into code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::result::{RunKind, RunResult};

pub(crate) const HARNESS_SOURCE: &str = include_str!("harness.py");

/// A fresh prefix for the report line of one run.
///
/// Candidate code never sees it in its own scope, so a line it prints to the
/// real stdout cannot pass for the harness report.
pub(crate) fn new_sentinel() -> String {
    format!("@@run-report-{}@@", Uuid::new_v4().simple())
}

#[derive(Debug, Serialize)]
pub(crate) struct HarnessPayload<'a> {
    pub sentinel: &'a str,
    pub source: &'a str,
    pub method: &'a str,
    pub args: &'a [Value],
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ReportError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("expected one report line, found {0}")]
    Duplicate(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportStatus {
    Completed,
    ParseFailure,
    MissingSymbol,
    MissingMethod,
    RuntimeFailure,
    HarnessFailure,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HarnessReport {
    pub status: ReportStatus,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HarnessReport {
    /// Finds the report line carrying this run's sentinel.
    ///
    /// Anything else on stdout was written around the capture buffer and is
    /// ignored. More than one report line means the run tampered with the
    /// channel, and none of them is trusted.
    pub fn from_stdout(stdout: &str, sentinel: &str) -> Option<Result<Self, ReportError>> {
        let mut reports = stdout.lines().filter_map(|line| line.strip_prefix(sentinel));
        let report = reports.next()?;
        let extra = reports.count();
        if extra > 0 {
            return Some(Err(ReportError::Duplicate(extra + 1)));
        }
        Some(serde_json::from_str(report).map_err(ReportError::from))
    }

    pub fn into_result(self, method: &str) -> RunResult {
        let message = self.message.unwrap_or_default();
        let kind = match self.status {
            ReportStatus::Completed => RunKind::Completed,
            ReportStatus::ParseFailure => RunKind::ParseFailure { message },
            ReportStatus::MissingSymbol => RunKind::MissingSymbol,
            ReportStatus::MissingMethod => RunKind::MissingMethod {
                name: method.to_string(),
            },
            ReportStatus::RuntimeFailure => RunKind::RuntimeFailure { message },
            ReportStatus::HarnessFailure => RunKind::HarnessFailure { message },
        };
        RunResult::new(kind, &self.output)
    }
}
