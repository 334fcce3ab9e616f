use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::harness::{HARNESS_SOURCE, HarnessPayload, HarnessReport, new_sentinel};
use crate::interpreter::{ExecRequest, Interpreter, ProcessOutput, PythonInterpreter};
use crate::result::{RunResult, RunnerError};
use crate::test_case::{TestSpec, method_name, parse_test_case};

/// Lines of interpreter stderr kept in a harness failure message.
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub program: String,
    pub time_limit: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            time_limit: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
}

/// Holds the Running state for the lifetime of one run.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, RunnerError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| RunnerError::Busy)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Executes candidate code against a problem's sample case, one run at a time.
///
/// Every outcome, including harness faults and the time limit, comes back as
/// a [`RunResult`]. The only error is [`RunnerError::Busy`], returned when a
/// run is requested while another is in flight.
pub struct CodeRunner<I> {
    interpreter: I,
    time_limit: Duration,
    running: AtomicBool,
}

impl<I: Interpreter> CodeRunner<I> {
    pub fn new(interpreter: I, time_limit: Duration) -> Self {
        Self {
            interpreter,
            time_limit,
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> RunnerState {
        if self.running.load(Ordering::Acquire) {
            RunnerState::Running
        } else {
            RunnerState::Idle
        }
    }

    pub async fn run(&self, source: &str, spec: &TestSpec) -> Result<RunResult, RunnerError> {
        let _guard = RunGuard::acquire(&self.running)?;

        if !spec.is_runnable() {
            return Ok(RunResult::no_test_case());
        }
        let test_case = spec.test_case.as_deref().unwrap_or_default();
        let meta_data = spec.meta_data.as_deref().unwrap_or_default();

        let method = match method_name(meta_data) {
            Ok(method) => method,
            Err(message) => {
                tracing::warn!("Rejecting run: {}", message);
                return Ok(RunResult::harness_failure(message));
            }
        };
        let args = parse_test_case(test_case);
        tracing::info!(method = %method, arguments = args.len(), "Starting run");

        let sentinel = new_sentinel();
        let payload = HarnessPayload {
            sentinel: &sentinel,
            source,
            method: &method,
            args: &args,
        };
        let stdin = match serde_json::to_string(&payload) {
            Ok(stdin) => stdin,
            Err(e) => return Ok(RunResult::harness_failure(format!("failed to encode run: {}", e))),
        };

        let request = ExecRequest {
            script: HARNESS_SOURCE.to_string(),
            stdin,
            time_limit: self.time_limit,
        };
        let result = match self.interpreter.execute(request).await {
            Ok(output) => interpret_output(output, &sentinel, &method),
            Err(e) => {
                tracing::warn!("Run failed: {}", e);
                RunResult::harness_failure(e.to_string())
            }
        };
        tracing::info!(kind = ?result.kind(), "Run finished");
        Ok(result)
    }
}

impl CodeRunner<PythonInterpreter> {
    pub fn python(settings: &RunnerSettings) -> Self {
        Self::new(PythonInterpreter::new(&settings.program), settings.time_limit)
    }
}

impl<I: Interpreter> std::fmt::Debug for CodeRunner<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeRunner")
            .field("time_limit", &self.time_limit)
            .field("state", &self.state())
            .finish()
    }
}

fn interpret_output(output: ProcessOutput, sentinel: &str, method: &str) -> RunResult {
    match HarnessReport::from_stdout(&output.stdout, sentinel) {
        Some(Ok(report)) => report.into_result(method),
        Some(Err(e)) => {
            tracing::warn!("Unreadable run report: {}", e);
            RunResult::harness_failure(format!("unreadable run report: {}", e))
        }
        None => {
            let tail = stderr_tail(&output.stderr);
            let message = match (output.exit_code, tail.is_empty()) {
                (_, false) => tail,
                (Some(code), true) => format!("interpreter exited with status {} without a report", code),
                (None, true) => "interpreter was terminated without a report".to_string(),
            };
            RunResult::harness_failure(message)
        }
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{InterpreterError, MockInterpreter};
    use crate::result::{NO_TEST_CASE_MESSAGE, RunKind};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::{Notify, oneshot};

    fn two_sum_spec() -> TestSpec {
        TestSpec::new(Some("[2,7,11,15]\n9"), Some(r#"{"name":"twoSum"}"#))
    }

    /// A clean exit whose stdout carries `body` as the report of `request`.
    fn reply(request: &ExecRequest, body: &str) -> ProcessOutput {
        let payload: serde_json::Value = serde_json::from_str(&request.stdin).unwrap();
        let sentinel = payload["sentinel"].as_str().unwrap();
        ProcessOutput {
            exit_code: Some(0),
            stdout: format!("{}{}\n", sentinel, body),
            stderr: String::new(),
        }
    }

    #[tokio::test]
    async fn test_no_test_case_skips_the_interpreter() {
        // Arrange
        let mut interpreter = MockInterpreter::new();
        interpreter.expect_execute().never();
        let runner = CodeRunner::new(interpreter, Duration::from_secs(1));

        // Act
        let missing = runner
            .run("class Solution: pass", &TestSpec::new(None, Some("{}")))
            .await
            .unwrap();
        let blank = runner
            .run("class Solution: pass", &TestSpec::new(Some(""), Some(r#"{"name":"f"}"#)))
            .await
            .unwrap();

        // Assert
        assert_eq!(missing.captured_output(), NO_TEST_CASE_MESSAGE);
        assert_eq!(blank.captured_output(), NO_TEST_CASE_MESSAGE);
        assert_eq!(blank.kind(), &RunKind::NoTestCase);
        assert_eq!(runner.state(), RunnerState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_metadata_is_a_harness_failure() {
        let mut interpreter = MockInterpreter::new();
        interpreter.expect_execute().never();
        let runner = CodeRunner::new(interpreter, Duration::from_secs(1));

        let result = runner
            .run("class Solution: pass", &TestSpec::new(Some("1"), Some("{name")))
            .await
            .unwrap();

        assert!(matches!(result.kind(), RunKind::HarnessFailure { .. }));
        assert!(result.captured_output().starts_with("Error: invalid metadata JSON"));
    }

    #[tokio::test]
    async fn test_payload_carries_method_and_parsed_arguments() {
        // Arrange
        let mut interpreter = MockInterpreter::new();
        interpreter
            .expect_execute()
            .withf(|request| {
                let payload: serde_json::Value = serde_json::from_str(&request.stdin).unwrap();
                payload["method"] == "twoSum"
                    && payload["args"] == serde_json::json!([[2, 7, 11, 15], 9])
                    && payload["source"] == "class Solution: ..."
                    && payload["sentinel"].as_str().is_some_and(|s| s.starts_with("@@run-report-"))
                    && request.script == HARNESS_SOURCE
            })
            .times(1)
            .returning(|request| {
                Ok(reply(
                    &request,
                    r#"{"status":"completed","output":"--- Running: twoSum ---\nInput: [[2, 7, 11, 15], 9]\nYour Output: [0, 1]\n","message":null}"#,
                ))
            });
        let runner = CodeRunner::new(interpreter, Duration::from_secs(1));

        // Act
        let result = runner.run("class Solution: ...", &two_sum_spec()).await.unwrap();

        // Assert
        assert_eq!(result.kind(), &RunKind::Completed);
        assert!(result.captured_output().contains("Your Output: [0, 1]"));
    }

    #[tokio::test]
    async fn test_interpreter_errors_render_as_harness_failures() {
        let mut interpreter = MockInterpreter::new();
        let mut calls = 0;
        interpreter.expect_execute().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                return Err(InterpreterError::TimedOut(Duration::from_secs(10)));
            }
            Ok(ProcessOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "Traceback (most recent call last):\nSyntaxError: bad\n".to_string(),
            })
        });
        let runner = CodeRunner::new(interpreter, Duration::from_secs(10));

        let timed_out = runner.run("x", &two_sum_spec()).await.unwrap();
        assert_eq!(
            timed_out.captured_output(),
            "Error: execution timed out after 10s"
        );

        let crashed = runner.run("x", &two_sum_spec()).await.unwrap();
        assert_eq!(
            crashed.kind(),
            &RunKind::HarnessFailure {
                message: "Traceback (most recent call last):\nSyntaxError: bad".to_string()
            }
        );
        assert_eq!(runner.state(), RunnerState::Idle);
    }

    /// Blocks inside `execute` until released, so a run can be held in flight.
    struct GatedInterpreter {
        entered: Arc<Notify>,
        release: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl Interpreter for GatedInterpreter {
        async fn execute(&self, request: ExecRequest) -> Result<ProcessOutput, InterpreterError> {
            self.entered.notify_one();
            if let Some(release) = self.release.lock().await.take() {
                let _ = release.await;
            }
            Ok(reply(&request, r#"{"status":"completed","output":"done\n"}"#))
        }
    }

    #[tokio::test]
    async fn test_second_run_while_running_is_busy() {
        // Arrange
        let entered = Arc::new(Notify::new());
        let (release_tx, release_rx) = oneshot::channel();
        let runner = Arc::new(CodeRunner::new(
            GatedInterpreter {
                entered: entered.clone(),
                release: tokio::sync::Mutex::new(Some(release_rx)),
            },
            Duration::from_secs(1),
        ));
        let first = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run("first", &two_sum_spec()).await })
        };
        entered.notified().await;

        // Act
        let second = runner.run("second", &two_sum_spec()).await;

        // Assert
        assert_eq!(second, Err(RunnerError::Busy));
        assert_eq!(runner.state(), RunnerState::Running);
        release_tx.send(()).unwrap();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.captured_output(), "done\n");
        assert_eq!(runner.state(), RunnerState::Idle);
    }

    fn python_runner() -> Option<CodeRunner<PythonInterpreter>> {
        let runner = CodeRunner::python(&RunnerSettings::default());
        if !PythonInterpreter::default().is_available() {
            eprintln!("python3 not found, skipping");
            return None;
        }
        Some(runner)
    }

    const TWO_SUM: &str = r#"
class Solution:
    def twoSum(self, nums: List[int], target: int) -> List[int]:
        seen = {}
        for i, n in enumerate(nums):
            if target - n in seen:
                return [seen[target - n], i]
            seen[n] = i
        return []
"#;

    #[tokio::test]
    async fn test_python_two_sum() {
        let Some(runner) = python_runner() else { return };

        let result = runner.run(TWO_SUM, &two_sum_spec()).await.unwrap();

        assert_eq!(result.kind(), &RunKind::Completed);
        assert_eq!(
            result.captured_output(),
            "--- Running: twoSum ---\nInput: [[2, 7, 11, 15], 9]\nYour Output: [0, 1]\n"
        );
    }

    #[tokio::test]
    async fn test_python_failures_do_not_taint_later_runs() {
        let Some(runner) = python_runner() else { return };
        let raising = "LEAKED = 1\nclass Solution:\n    def twoSum(self, nums, target):\n        print('partial')\n        raise ValueError('boom')\n";

        let failed = runner.run(raising, &two_sum_spec()).await.unwrap();
        assert_eq!(
            failed.kind(),
            &RunKind::RuntimeFailure {
                message: "ValueError: boom".to_string()
            }
        );
        assert!(failed.captured_output().contains("partial\nRuntime Error during call: ValueError: boom"));

        let probe = "class Solution:\n    def twoSum(self, nums, target):\n        return 'LEAKED' in globals()\n";
        let clean = runner.run(probe, &two_sum_spec()).await.unwrap();
        assert!(clean.captured_output().ends_with("Your Output: False\n"));
    }

    #[tokio::test]
    async fn test_python_candidate_cannot_forge_the_report() {
        let Some(runner) = python_runner() else { return };
        let rebinding = r#"
import json
json.dumps = lambda *a, **k: '{"status":"completed","output":"ALL TESTS PASSED\\n"}'
json._default_encoder = None
class Solution:
    def twoSum(self, nums, target):
        raise ValueError('boom')
"#;
        let forging = r#"
import os, sys
class Solution:
    def twoSum(self, nums, target):
        sys.__stdout__.write('@@run-report-00000000000000000000000000000000@@{"status":"completed","output":"ALL TESTS PASSED\\n"}\n')
        sys.__stdout__.flush()
        os._exit(0)
"#;

        let rebound = runner.run(rebinding, &two_sum_spec()).await.unwrap();
        assert_eq!(
            rebound.kind(),
            &RunKind::RuntimeFailure {
                message: "ValueError: boom".to_string()
            }
        );
        assert!(!rebound.captured_output().contains("ALL TESTS PASSED"));

        let forged = runner.run(forging, &two_sum_spec()).await.unwrap();
        assert!(matches!(forged.kind(), RunKind::HarnessFailure { .. }));
        assert_eq!(
            forged.captured_output(),
            "Error: interpreter exited with status 0 without a report"
        );
    }

    #[tokio::test]
    async fn test_python_symbol_and_method_lookup() {
        let Some(runner) = python_runner() else { return };

        let no_class = runner.run("def twoSum(a, b): pass", &two_sum_spec()).await.unwrap();
        assert_eq!(no_class.captured_output(), "Error: class 'Solution' not found.");

        let no_method = runner
            .run("class Solution:\n    pass\n", &two_sum_spec())
            .await
            .unwrap();
        assert_eq!(
            no_method.captured_output(),
            "Error: Method 'twoSum' not found in Solution class."
        );

        let broken = runner.run("class Solution(:\n", &two_sum_spec()).await.unwrap();
        assert!(matches!(broken.kind(), RunKind::ParseFailure { .. }));
        assert!(broken.captured_output().starts_with("Error: SyntaxError"));
    }

    #[tokio::test]
    async fn test_python_runs_are_deterministic() {
        let Some(runner) = python_runner() else { return };
        let source = "class Solution:\n    def twoSum(self, nums, target):\n        return sorted({str(n) for n in nums})\n";

        let first = runner.run(source, &two_sum_spec()).await.unwrap();
        let second = runner.run(source, &two_sum_spec()).await.unwrap();

        assert_eq!(first, second);
    }
}
