//! Sandboxed execution of candidate solutions against a single sample case.
//!
//! The runner wraps untrusted source in a harness, runs it in a fresh
//! interpreter process and always hands back readable text. At most one run
//! is in flight per runner; a second request is rejected with
//! [`RunnerError::Busy`].

mod harness;
pub mod interpreter;
pub mod result;
pub mod runner;
pub mod test_case;

pub use interpreter::{ExecRequest, Interpreter, InterpreterError, ProcessOutput, PythonInterpreter};
pub use result::{RunKind, RunResult, RunnerError};
pub use runner::{CodeRunner, RunnerSettings, RunnerState};
pub use test_case::{TestSpec, parse_argument_literal, parse_test_case};
