//! CLI-based runtime client supporting Docker and Podman.
//!
//! Every primitive is a single invocation of the runtime binary with a
//! structured argument list. No shell is involved, so argument values are
//! passed through untouched.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::client::{CommandOutput, CreateSpec, RuntimeClient};
use crate::error::{RuntimeError, RuntimeResult};

/// Container runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// Get the CLI command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

impl std::fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

impl std::str::FromStr for ContainerRuntime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            other => Err(format!("unknown container runtime: {}", other)),
        }
    }
}

/// CLI client options.
#[derive(Debug, Clone, Default)]
pub struct CliClientOptions {
    /// Preferred runtime (if not set, auto-detect)
    pub preferred_runtime: Option<ContainerRuntime>,
}

impl CliClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer(mut self, runtime: ContainerRuntime) -> Self {
        self.preferred_runtime = Some(runtime);
        self
    }
}

/// Runtime client that shells out to the `docker` or `podman` binary.
pub struct CliClient {
    runtime: ContainerRuntime,
}

impl CliClient {
    /// Create a new CLI client with automatic runtime detection.
    pub async fn new(options: CliClientOptions) -> RuntimeResult<Self> {
        let runtime = Self::detect_runtime(&options).await?;
        info!("Using container runtime: {}", runtime);
        Ok(Self { runtime })
    }

    /// Create a client bound to a specific runtime, without probing it.
    pub fn with_runtime(runtime: ContainerRuntime) -> Self {
        Self { runtime }
    }

    /// Detect an available container runtime.
    pub async fn detect_runtime(options: &CliClientOptions) -> RuntimeResult<ContainerRuntime> {
        if let Some(preferred) = options.preferred_runtime {
            if Self::is_runtime_available(preferred).await {
                return Ok(preferred);
            }
            warn!(
                "Preferred runtime {} not available, trying alternatives",
                preferred
            );
        }

        for runtime in [ContainerRuntime::Docker, ContainerRuntime::Podman] {
            if Self::is_runtime_available(runtime).await {
                return Ok(runtime);
            }
        }

        Err(RuntimeError::NotAvailable(
            "Neither Docker nor Podman is available".to_string(),
        ))
    }

    async fn is_runtime_available(runtime: ContainerRuntime) -> bool {
        Command::new(runtime.command())
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Get the current runtime.
    pub fn runtime(&self) -> ContainerRuntime {
        self.runtime
    }

    /// Build the argument list for `create`.
    pub fn build_create_args(spec: &CreateSpec) -> Vec<String> {
        let mut args = vec!["create".to_string()];

        if spec.tty {
            args.push("--tty".to_string());
        }

        args.push("--name".to_string());
        args.push(spec.name.clone());

        if spec.auto_remove {
            args.push("--rm".to_string());
        }

        for binding in &spec.env {
            args.push("-e".to_string());
            args.push(binding.to_flag_value());
        }

        for host in &spec.hosts {
            args.push("--add-host".to_string());
            args.push(host.to_flag_value());
        }

        args.push(spec.image.clone());
        args
    }

    /// Format command for logging.
    fn format_command(&self, args: &[String]) -> String {
        let mut cmd = self.runtime.command().to_string();
        for arg in args {
            if arg.contains(' ') || arg.contains('=') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    /// Run the runtime binary and capture its output.
    async fn run(&self, args: Vec<String>) -> RuntimeResult<CommandOutput> {
        debug!("Executing: {}", self.format_command(&args));

        let started_at = Utc::now();
        let output = Command::new(self.runtime.command())
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                program: self.runtime.command().to_string(),
                source,
            })?;
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            started_at,
            duration_ms,
        })
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl RuntimeClient for CliClient {
    async fn remove(&self, name: &str, force: bool) -> RuntimeResult<CommandOutput> {
        let mut cmd = args(["rm"]);
        if force {
            cmd.push("-f".to_string());
        }
        cmd.push(name.to_string());
        self.run(cmd).await
    }

    async fn create(&self, spec: &CreateSpec) -> RuntimeResult<CommandOutput> {
        self.run(Self::build_create_args(spec)).await
    }

    async fn start(&self, name: &str) -> RuntimeResult<CommandOutput> {
        self.run(args(["start", name])).await
    }

    async fn exec(&self, name: &str, command: &[String]) -> RuntimeResult<CommandOutput> {
        let mut cmd = args(["exec", name]);
        cmd.extend(command.iter().cloned());
        self.run(cmd).await
    }

    async fn stop(&self, name: &str) -> RuntimeResult<CommandOutput> {
        self.run(args(["stop", name])).await
    }

    async fn rename(&self, from: &str, to: &str) -> RuntimeResult<CommandOutput> {
        self.run(args(["rename", from, to])).await
    }

    async fn copy_into(
        &self,
        source: &Path,
        name: &str,
        destination: &str,
    ) -> RuntimeResult<CommandOutput> {
        let target = format!("{}:{}", name, destination);
        let cmd = vec![
            "cp".to_string(),
            source.to_string_lossy().into_owned(),
            target,
        ];
        self.run(cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostBinding;
    use crate::env::EnvBinding;

    #[test]
    fn test_build_create_args() {
        let spec = CreateSpec {
            name: "greenframe-runner".to_string(),
            image: "mcr.microsoft.com/playwright:v1.30.0-focal".to_string(),
            env: vec![
                EnvBinding::new("HOSTIP", "172.17.0.1"),
                EnvBinding::new("EXTRA_HOSTS", "a.local,b.local"),
            ],
            hosts: vec![
                HostBinding::new("localhost", "172.17.0.1"),
                HostBinding::new("a.local", "172.17.0.1"),
            ],
            tty: true,
            auto_remove: true,
        };

        let args = CliClient::build_create_args(&spec);

        assert_eq!(
            args,
            vec![
                "create",
                "--tty",
                "--name",
                "greenframe-runner",
                "--rm",
                "-e",
                "HOSTIP=172.17.0.1",
                "-e",
                "EXTRA_HOSTS=a.local,b.local",
                "--add-host",
                "localhost:172.17.0.1",
                "--add-host",
                "a.local:172.17.0.1",
                "mcr.microsoft.com/playwright:v1.30.0-focal",
            ]
        );
    }

    #[test]
    fn test_env_values_are_single_arguments() {
        let spec = CreateSpec {
            name: "c".to_string(),
            image: "img".to_string(),
            env: vec![EnvBinding::new("MSG", "hello world; rm -rf /")],
            hosts: Vec::new(),
            tty: false,
            auto_remove: false,
        };

        let args = CliClient::build_create_args(&spec);

        assert_eq!(args, vec!["create", "--name", "c", "-e", "MSG=hello world; rm -rf /", "img"]);
    }

    #[test]
    fn test_runtime_from_str() {
        assert_eq!("docker".parse::<ContainerRuntime>(), Ok(ContainerRuntime::Docker));
        assert_eq!("Podman".parse::<ContainerRuntime>(), Ok(ContainerRuntime::Podman));
        assert!("lxc".parse::<ContainerRuntime>().is_err());
    }

    #[test]
    fn test_format_command_quotes() {
        let client = CliClient::with_runtime(ContainerRuntime::Podman);
        let formatted = client.format_command(&args(["exec", "c", "--url=a b"]));
        assert_eq!(formatted, "podman exec c '--url=a b'");
    }
}
