//! Execution of generated Python
//!
//! The compiler core never runs code. Callers that want to execute a
//! translation hand it to an [`Executor`] together with a [`Session`] that
//! remembers what was accepted earlier.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use log::debug;

/// Environment variable naming the host interpreter
pub const PYTHON_ENV: &str = "NACHSHON_PYTHON";

/// Interpreter used when `NACHSHON_PYTHON` is unset
pub const DEFAULT_PYTHON: &str = "python3";

/// Result of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Empty unless output is captured
    pub stdout: String,
    pub stderr: String,
}

/// Submissions accepted so far; each execution replays them first
#[derive(Debug, Clone, Default)]
pub struct Session {
    submissions: Vec<String>,
    replayed_output: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> &[String] {
        &self.submissions
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// Forget every accepted submission
    pub fn reset(&mut self) {
        self.submissions.clear();
        self.replayed_output.clear();
    }

    /// Earlier submissions followed by `code`
    pub fn script_with(&self, code: &str) -> String {
        let mut script = self.submissions.concat();
        script.push_str(code);
        if !script.ends_with('\n') {
            script.push('\n');
        }
        script
    }

    /// Record a successful submission and the stdout it produced
    fn accept(&mut self, code: &str, stdout: &str) {
        let mut code = code.to_string();
        if !code.ends_with('\n') {
            code.push('\n');
        }
        self.submissions.push(code);
        self.replayed_output.push_str(stdout);
    }

    /// Drop the part of `stdout` that replaying earlier submissions produced
    fn strip_replayed<'a>(&self, stdout: &'a str) -> &'a str {
        stdout.strip_prefix(self.replayed_output.as_str()).unwrap_or(stdout)
    }
}

/// Runs generated code
pub trait Executor {
    /// Execute `code` after the session's earlier submissions. On success
    /// the code is added to the session.
    fn execute(&mut self, code: &str, session: &mut Session) -> Result<Outcome>;
}

/// Host Python interpreter run as a child process
#[derive(Debug, Clone)]
pub struct PythonProcess {
    interpreter: String,
    capture: bool,
}

impl PythonProcess {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self { interpreter: interpreter.into(), capture: true }
    }

    /// Interpreter from `NACHSHON_PYTHON`, else `python3`
    pub fn from_env() -> Self {
        let interpreter = std::env::var(PYTHON_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PYTHON.to_string());
        Self::new(interpreter)
    }

    /// Let the program use the terminal directly instead of capturing output
    pub fn inherit_stdio(mut self) -> Self {
        self.capture = false;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Can the interpreter be started at all?
    pub fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Executor for PythonProcess {
    fn execute(&mut self, code: &str, session: &mut Session) -> Result<Outcome> {
        let script = session.script_with(code);
        debug!(
            "running {} ({} replayed submissions, {} bytes)",
            self.interpreter,
            session.submissions().len(),
            script.len()
        );

        let mut command = Command::new(&self.interpreter);
        command.arg("-c").arg(&script).env("PYTHONIOENCODING", "utf-8");

        let outcome = if self.capture {
            let output = command
                .stdin(Stdio::null())
                .output()
                .with_context(|| format!("failed to start '{}'", self.interpreter))?;
            let stdout = String::from_utf8_lossy(&output.stdout);
            Outcome {
                success: output.status.success(),
                exit_code: output.status.code(),
                stdout: session.strip_replayed(&stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        } else {
            let status = command
                .status()
                .with_context(|| format!("failed to start '{}'", self.interpreter))?;
            Outcome { success: status.success(), exit_code: status.code(), ..Outcome::default() }
        };

        if outcome.success {
            session.accept(code, &outcome.stdout);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn python() -> Option<PythonProcess> {
        let process = PythonProcess::new(DEFAULT_PYTHON);
        if process.is_available() {
            Some(process)
        } else {
            eprintln!("skipping: {} not installed", DEFAULT_PYTHON);
            None
        }
    }

    #[test]
    fn test_session_replay_and_reset() {
        let mut session = Session::new();
        assert_eq!(session.script_with("x = 1"), "x = 1\n");

        session.accept("x = 1", "");
        session.accept("y = 2\n", "2\n");
        assert_eq!(session.script_with("print(x + y)"), "x = 1\ny = 2\nprint(x + y)\n");
        assert_eq!(session.strip_replayed("2\n3\n"), "3\n");

        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.script_with("pass"), "pass\n");
        assert_eq!(session.strip_replayed("2\n"), "2\n");
    }

    #[test]
    fn test_missing_interpreter_is_an_error() {
        let mut process = PythonProcess::new("nachshon-no-such-interpreter");
        assert!(!process.is_available());
        assert!(process.execute("pass", &mut Session::new()).is_err());
    }

    #[test]
    fn test_python_session_keeps_state() {
        let Some(mut process) = python() else { return };
        let mut session = Session::new();

        let first = process.execute("x = 20\nprint('ready')", &mut session).unwrap();
        assert!(first.success);
        assert_eq!(first.stdout, "ready\n");

        let second = process.execute("print(x + 1)", &mut session).unwrap();
        assert_eq!(second.stdout, "21\n");
        assert_eq!(session.submissions().len(), 2);

        let failed = process.execute("raise ValueError('x')", &mut session).unwrap();
        assert!(!failed.success);
        assert!(failed.stderr.contains("ValueError"));
        assert_eq!(session.submissions().len(), 2);

        session.reset();
        let after_reset = process.execute("print('x' in dir())", &mut session).unwrap();
        assert_eq!(after_reset.stdout, "False\n");
    }
}
