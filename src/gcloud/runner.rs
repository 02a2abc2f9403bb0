//! Command execution
//!
//! Runs built commands through the gcloud CLI. Every call blocks until the
//! child process exits.

use super::command::{CommandResult, GcloudCommand};
use crate::error::{Error, Result};
use std::process::{Command, Stdio};

/// Executes a [`GcloudCommand`] and reports success plus its text output
pub trait CommandRunner {
    fn run(&self, cmd: &GcloudCommand) -> CommandResult;
}

/// Run a command whose failure is fatal for `action`
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    cmd: &GcloudCommand,
    action: &str,
) -> Result<CommandResult> {
    let result = runner.run(cmd);
    if !result.success && cmd.exit_on_error {
        return Err(Error::CommandFailure {
            action: action.to_string(),
            message: result.message.trim().to_string(),
        });
    }
    Ok(result)
}

/// Runner backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cmd: &GcloudCommand) -> CommandResult {
        tracing::debug!("Executing: {}", cmd);

        let output = match Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                let message = format!("Failed to execute {}: {}", cmd.program, e);
                if cmd.log_error {
                    tracing::error!("{}", message);
                }
                return CommandResult::failed(message);
            },
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if output.status.success() {
            return CommandResult::ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let message = if stderr.trim().is_empty() {
            format!(
                "{} exited with status {}",
                cmd.program,
                output.status.code().unwrap_or(-1)
            )
        } else {
            stderr
        };

        if cmd.log_error {
            tracing::error!("Command failed: {}: {}", cmd, message.trim());
        }

        CommandResult::failed(message)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Answers commands from a closure and records every call
    pub struct ScriptedRunner {
        respond: Box<dyn Fn(&GcloudCommand) -> CommandResult>,
        calls: RefCell<Vec<GcloudCommand>>,
    }

    impl ScriptedRunner {
        pub fn new(respond: impl Fn(&GcloudCommand) -> CommandResult + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<GcloudCommand> {
            self.calls.borrow().clone()
        }

        /// Calls whose leading tokens match `prefix`
        pub fn calls_starting_with(&self, prefix: &[&str]) -> Vec<GcloudCommand> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| starts_with(c, prefix))
                .cloned()
                .collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, cmd: &GcloudCommand) -> CommandResult {
            self.calls.borrow_mut().push(cmd.clone());
            (self.respond)(cmd)
        }
    }

    /// Leading tokens of `cmd` equal `prefix`
    pub fn starts_with(cmd: &GcloudCommand, prefix: &[&str]) -> bool {
        cmd.args.len() >= prefix.len() && cmd.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedRunner;
    use super::*;

    #[test]
    fn test_run_checked_fatal_failure() {
        let runner = ScriptedRunner::new(|_| CommandResult::failed("PERMISSION_DENIED\n"));
        let cmd = GcloudCommand::new(["run", "jobs", "create", "x"]);

        let err = run_checked(&runner, &cmd, "create Cloud Run Job").unwrap_err();
        match err {
            Error::CommandFailure { action, message } => {
                assert_eq!(action, "create Cloud Run Job");
                assert_eq!(message, "PERMISSION_DENIED");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_checked_tolerated_failure() {
        let runner = ScriptedRunner::new(|_| CommandResult::failed("NOT_FOUND"));
        let cmd = GcloudCommand::new(["storage", "buckets", "describe"]).quiet();

        let result = run_checked(&runner, &cmd, "describe bucket").unwrap();
        assert!(!result.success);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_process_runner_missing_program() {
        let mut cmd = GcloudCommand::new(["--version"]).quiet();
        cmd.program = "gcp-inventory-definitely-not-installed".to_string();

        let result = ProcessRunner.run(&cmd);
        assert!(!result.success);
        assert!(result.message.contains("Failed to execute"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_output() {
        let mut cmd = GcloudCommand::new(["hello"]);
        cmd.program = "echo".to_string();

        let result = ProcessRunner.run(&cmd);
        assert!(result.success);
        assert_eq!(result.message.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_reports_stderr() {
        let mut cmd = GcloudCommand::new(["-c", "echo 'ERROR: boom' >&2; exit 3"]).quiet();
        cmd.program = "sh".to_string();

        let result = ProcessRunner.run(&cmd);
        assert!(!result.success);
        assert_eq!(result.message.trim(), "ERROR: boom");
    }
}
