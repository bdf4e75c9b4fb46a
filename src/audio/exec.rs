//! Testable execution of external audio tooling.
//!
//! The `CommandExecutor` trait enables full testability without ffmpeg
//! installed: production code uses `SystemCommandExecutor`, tests substitute
//! a mock that records invocations.

use crate::error::{Result, ScribaError};
use std::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command fails or is not found.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribaError::AudioToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                ScribaError::CommandFailed {
                    command: command.to_string(),
                    status: "spawn error".to_string(),
                    stderr: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScribaError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
