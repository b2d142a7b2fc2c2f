use std::process::{Command, Output, Stdio};

use crate::error::{ProvisionError, ProvisionResult};

/// Executes external programs on behalf of the provisioning
/// phases. Every host interaction goes through this trait so the
/// phases can be driven by a scripted runner in tests.
pub trait CommandRunner {
    /// Run a command and capture its trimmed stdout. Fails if the
    /// command returns a non-zero exit code.
    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String>;

    /// Run a command with stdin/stdout/stderr inherited.
    fn run_interactive(&self, program: &str, args: &[&str]) -> ProvisionResult<()>;

    /// Check if a command exists on PATH.
    fn command_exists(&self, program: &str) -> bool;

    /// Run a shell pipeline (via `sh -c`).
    fn run_pipeline(&self, shell_cmd: &str) -> ProvisionResult<()> {
        self.run_interactive("sh", &["-c", shell_cmd])
    }
}

/// Runs commands on the local host with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct System;

impl CommandRunner for System {
    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String> {
        let command = format_command(program, args);
        tracing::debug!("exec (capture): {command}");

        let output = spawn(program, args)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!("stderr: {stderr}");
            Err(ProvisionError::CommandFailed {
                command,
                code: output.status.code(),
                stderr,
            })
        }
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> ProvisionResult<()> {
        let command = format_command(program, args);
        tracing::debug!("exec: {command}");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| not_found_or_io(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ProvisionError::CommandFailed {
                command,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }

    fn command_exists(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }
}

fn spawn(program: &str, args: &[&str]) -> ProvisionResult<Output> {
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| not_found_or_io(program, e))
}

fn not_found_or_io(program: &str, e: std::io::Error) -> ProvisionError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ProvisionError::CommandNotFound(program.to_string())
    } else {
        ProvisionError::Io(e)
    }
}

/// Join a program and its arguments into a single printable line.
#[must_use]
pub fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}
