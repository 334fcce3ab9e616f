use serde::Serialize;

/// Printed when the problem carries no runnable sample case.
pub const NO_TEST_CASE_MESSAGE: &str = "No test case(s)";

/// How a run concluded.
///
/// Only `Completed` means the candidate method was invoked and returned; all
/// other variants are outcomes the caller renders as text, never faults that
/// escape the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunKind {
    Completed,
    NoTestCase,
    /// Candidate source failed to compile or raised at top level.
    ParseFailure { message: String },
    /// No `Solution` type in the candidate's scope.
    MissingSymbol,
    MissingMethod { name: String },
    /// The invoked method raised.
    RuntimeFailure { message: String },
    /// The harness itself failed (bad metadata, interpreter unavailable, time limit).
    HarnessFailure { message: String },
}

impl RunKind {
    /// The line appended to the captured output for this outcome, if any.
    pub fn failure_line(&self) -> Option<String> {
        match self {
            Self::Completed => None,
            Self::NoTestCase => Some(NO_TEST_CASE_MESSAGE.to_string()),
            Self::ParseFailure { message } | Self::HarnessFailure { message } => {
                Some(format!("Error: {}", message))
            }
            Self::MissingSymbol => Some("Error: class 'Solution' not found.".to_string()),
            Self::MissingMethod { name } => {
                Some(format!("Error: Method '{}' not found in Solution class.", name))
            }
            Self::RuntimeFailure { message } => {
                Some(format!("Runtime Error during call: {}", message))
            }
        }
    }
}

/// The text a run produced plus the outcome tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    #[serde(flatten)]
    kind: RunKind,
    #[serde(rename = "output")]
    captured_output: String,
}

impl RunResult {
    /// Builds a result from whatever the harness captured, appending the
    /// outcome's failure line on its own line.
    pub fn new(kind: RunKind, captured: &str) -> Self {
        let mut captured_output = captured.to_string();
        if let Some(line) = kind.failure_line() {
            if !captured_output.is_empty() && !captured_output.ends_with('\n') {
                captured_output.push('\n');
            }
            captured_output.push_str(&line);
        }
        Self {
            kind,
            captured_output,
        }
    }

    pub fn no_test_case() -> Self {
        Self::new(RunKind::NoTestCase, "")
    }

    pub fn harness_failure(message: impl Into<String>) -> Self {
        Self::new(
            RunKind::HarnessFailure {
                message: message.into(),
            },
            "",
        )
    }

    pub fn kind(&self) -> &RunKind {
        &self.kind
    }

    pub fn captured_output(&self) -> &str {
        &self.captured_output
    }

    pub fn into_captured_output(self) -> String {
        self.captured_output
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RunnerError {
    #[error("a run is already in progress")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_test_case_is_exactly_the_message() {
        let result = RunResult::no_test_case();
        assert_eq!(result.captured_output(), NO_TEST_CASE_MESSAGE);
        assert_eq!(result.kind(), &RunKind::NoTestCase);
    }

    #[test]
    fn test_failure_line_goes_after_captured_text() {
        let result = RunResult::new(
            RunKind::RuntimeFailure {
                message: "ZeroDivisionError: division by zero".to_string(),
            },
            "--- Running: divide ---\nInput: [1, 0]\n",
        );
        assert_eq!(
            result.captured_output(),
            "--- Running: divide ---\nInput: [1, 0]\nRuntime Error during call: ZeroDivisionError: division by zero"
        );

        let result = RunResult::new(RunKind::MissingSymbol, "loaded");
        assert_eq!(
            result.captured_output(),
            "loaded\nError: class 'Solution' not found."
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let result = RunResult::new(
            RunKind::MissingMethod {
                name: "twoSum".to_string(),
            },
            "",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "missing_method");
        assert_eq!(json["name"], "twoSum");
        assert_eq!(
            json["output"],
            "Error: Method 'twoSum' not found in Solution class."
        );
    }
}
