use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// Captured result of a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns child processes.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessLauncher {
    /// Runs `program` with inherited standard streams and returns its exit code.
    fn status(&self, program: &Path, args: &[OsString]) -> Result<i32>;

    /// Runs `program` and captures its output.
    fn output(&self, program: &Path, args: &[OsString]) -> Result<ProcessOutput>;
}

pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn status(&self, program: &Path, args: &[OsString]) -> Result<i32> {
        debug!("running {} {:?}", program.display(), args);
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run {}", program.display()))?;

        Ok(status.code().unwrap_or(-1))
    }

    fn output(&self, program: &Path, args: &[OsString]) -> Result<ProcessOutput> {
        debug!("running {} {:?} (captured)", program.display(), args);
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {}", program.display()))?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs `script` with `interpreter`, forwarding `args`, and returns the
/// script's exit code.
pub fn run_script(
    launcher: &dyn ProcessLauncher,
    interpreter: &Path,
    script: &str,
    args: &[String],
) -> Result<i32> {
    let mut command_args = Vec::with_capacity(args.len() + 1);
    command_args.push(OsString::from(script));
    command_args.extend(args.iter().map(OsString::from));

    launcher
        .status(interpreter, &command_args)
        .context("Failed to run script")
}
