use crate::types::ExecutionResult;
use std::process::{Command, Stdio};

/// Exit code reported when the shell itself could not be started.
pub const SPAWN_FAILURE_CODE: i32 = 127;

pub trait CommandRunner {
    fn run(&self, command: &str) -> ExecutionResult;
}

/// Runs commands through bash so builtins like `source` behave as users expect.
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::with_shell("/bin/bash")
    }
}

impl ShellRunner {
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> ExecutionResult {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(result) => {
                let exit_code = result.status.code().unwrap_or(-1);
                tracing::info!(command, exit_code, "command finished");
                ExecutionResult {
                    exit_code,
                    stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
                }
            }
            Err(e) => {
                tracing::error!(command, shell = %self.shell, error = %e, "failed to spawn shell");
                ExecutionResult {
                    exit_code: SPAWN_FAILURE_CODE,
                    stdout: String::new(),
                    stderr: format!("failed to start {}: {}", self.shell, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sh() -> ShellRunner {
        ShellRunner::with_shell("/bin/sh")
    }

    #[test]
    fn captures_stdout_and_exit_code() {
        let result = sh().run("echo hello");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn captures_stderr_and_failure() {
        let result = sh().run("echo oops >&2; exit 3");
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr, "oops\n");
        assert!(!result.success());
    }

    #[test]
    fn runs_in_current_directory() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let result = sh().run("pwd -P");
        assert_eq!(result.stdout.trim(), cwd.to_string_lossy());
    }

    #[test]
    fn missing_shell_is_a_failed_result_not_a_panic() {
        let result = ShellRunner::with_shell("/nonexistent/shell-for-tests").run("ls");
        assert_eq!(result.exit_code, SPAWN_FAILURE_CODE);
        assert!(result.stderr.contains("failed to start"));
        assert!(result.stdout.is_empty());
    }
}
