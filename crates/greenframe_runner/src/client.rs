//! Runtime client trait and types.
//!
//! [`RuntimeClient`] is the narrow surface the lifecycle manager drives.
//! Each method maps to one runtime primitive and returns the captured
//! [`CommandOutput`]; interpreting that output is the caller's job.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::HostBinding;
use crate::env::EnvBinding;
use crate::error::RuntimeResult;

/// Output captured from a single runtime invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Invocation start time
    pub started_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn new(exit_code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Successful invocation with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(Some(0), stdout, "")
    }

    /// Failed invocation with the given stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new(Some(exit_code), "", stderr)
    }

    /// Check if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Check if anything was written to stderr.
    pub fn has_diagnostics(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// Best available failure description.
    pub fn failure_message(&self) -> String {
        if self.has_diagnostics() {
            self.stderr.clone()
        } else {
            match self.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            }
        }
    }
}

/// Everything the runtime needs to create the scenario container.
#[derive(Debug, Clone)]
pub struct CreateSpec {
    /// Container name
    pub name: String,
    /// Image reference, including tag
    pub image: String,
    /// Environment injected into the container
    pub env: Vec<EnvBinding>,
    /// Hosts-file entries
    pub hosts: Vec<HostBinding>,
    /// Allocate a TTY
    pub tty: bool,
    /// Remove the container once it stops
    pub auto_remove: bool,
}

/// Container runtime control surface.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Remove a container, killing it first when `force` is set.
    async fn remove(&self, name: &str, force: bool) -> RuntimeResult<CommandOutput>;

    /// Create (but do not start) a container.
    async fn create(&self, spec: &CreateSpec) -> RuntimeResult<CommandOutput>;

    /// Start a created container.
    async fn start(&self, name: &str) -> RuntimeResult<CommandOutput>;

    /// Run a command inside a running container.
    async fn exec(&self, name: &str, command: &[String]) -> RuntimeResult<CommandOutput>;

    /// Stop a running container.
    async fn stop(&self, name: &str) -> RuntimeResult<CommandOutput>;

    /// Rename a container.
    async fn rename(&self, from: &str, to: &str) -> RuntimeResult<CommandOutput>;

    /// Copy a host path into a container's filesystem.
    async fn copy_into(
        &self,
        source: &Path,
        name: &str,
        destination: &str,
    ) -> RuntimeResult<CommandOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_diagnostics() {
        let ok = CommandOutput::ok("abc123\n");
        assert!(ok.success());
        assert!(!ok.has_diagnostics());

        let warned = CommandOutput::new(Some(0), "", "WARNING: something\n");
        assert!(warned.success());
        assert!(warned.has_diagnostics());
    }

    #[test]
    fn test_failure_message_prefers_stderr() {
        let failed = CommandOutput::failed(1, "Error: No such container: x\n");
        assert_eq!(failed.failure_message(), "Error: No such container: x\n");

        let silent = CommandOutput::failed(125, "");
        assert_eq!(silent.failure_message(), "exited with code 125");

        let killed = CommandOutput::new(None, "", "");
        assert_eq!(killed.failure_message(), "terminated by signal");
    }
}
