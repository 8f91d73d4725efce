//! CLI command definitions.
//!
//! Each subcommand maps to one lifecycle operation on the scenario
//! container, plus `run` which chains them with guaranteed cleanup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use greenframe_runner::{
    CliClient, CliClientOptions, ContainerManager, ContainerRuntime, ContainerSettings,
    EnvSnapshot, HostIpResolver, ScenarioOptions, ScenarioRequest, ScenarioResult, ScriptHostIp,
    StaticHostIp, CONTAINER_NAME,
};

pub mod create;
pub mod exec;
pub mod run;
pub mod start;
pub mod stop;

/// GreenFrame scenario container
#[derive(Parser)]
#[command(name = "greenframe-container")]
#[command(version, about = "Manage the GreenFrame scenario container")]
#[command(long_about = r#"
Manage the disposable container GreenFrame runs measurement scenarios in.

COMMANDS:
  create  → Remove any previous container, create a fresh one, copy the app in
  start   → Start the created container
  exec    → Run a scenario and print its timelines and milestones as JSON
  stop    → Rename and stop the container (never fails)
  run     → create + start + exec, always followed by stop

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Container creation failure
  4 - Container start failure
  5 - Scenario failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the scenario container from scratch
    Create(create::CreateArgs),

    /// Start the created container
    Start(start::StartArgs),

    /// Run a scenario in the running container
    Exec(exec::ExecArgs),

    /// Stop the container
    Stop(stop::StopArgs),

    /// Create, start, run a scenario and stop
    Run(run::RunArgs),
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ContainerArgs {
    /// Container runtime (docker or podman; auto-detected when omitted)
    #[arg(long, global = true, env = "GREENFRAME_RUNTIME")]
    pub runtime: Option<ContainerRuntime>,

    /// Application directory copied into the container
    #[arg(long, global = true, env = "GREENFRAME_INSTALL_DIR", default_value = ".")]
    pub install_dir: PathBuf,

    /// Base image for the container
    #[arg(long, global = true, env = "GREENFRAME_IMAGE")]
    pub image: Option<String>,

    /// Host IP to use instead of running the discovery script
    #[arg(long, global = true, env = "GREENFRAME_HOST_IP")]
    pub host_ip: Option<String>,

    /// Container name
    #[arg(long, global = true, default_value = CONTAINER_NAME)]
    pub container_name: String,
}

impl ContainerArgs {
    pub fn settings(&self) -> Result<ContainerSettings> {
        let install_dir = if self.install_dir.is_absolute() {
            self.install_dir.clone()
        } else {
            std::env::current_dir()
                .context("Failed to read current directory")?
                .join(&self.install_dir)
        };

        let mut settings = ContainerSettings::new(install_dir).name(&self.container_name);
        if let Some(image) = &self.image {
            settings = settings.image(image);
        }
        Ok(settings)
    }

    /// Build a manager wired to the real runtime.
    pub async fn manager(&self) -> Result<ContainerManager> {
        let settings = self.settings()?;

        let options = match self.runtime {
            Some(runtime) => CliClientOptions::new().prefer(runtime),
            None => CliClientOptions::new(),
        };
        let client = CliClient::new(options)
            .await
            .context("No container runtime found")?;

        let host_ip: Arc<dyn HostIpResolver> = match &self.host_ip {
            Some(ip) => Arc::new(StaticHostIp(ip.clone())),
            None => Arc::new(ScriptHostIp::new(settings.host_ip_script.clone())),
        };

        Ok(ContainerManager::new(
            settings,
            Arc::new(client),
            host_ip,
            EnvSnapshot::from_process(),
        ))
    }
}

/// Scenario parameters shared by `exec` and `run`.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario reference passed to the in-container runner
    #[arg(short, long)]
    pub scenario: String,

    /// Target URL
    #[arg(short, long)]
    pub url: String,

    /// Block ads while running the scenario
    #[arg(long)]
    pub use_adblock: bool,

    /// Ignore HTTPS certificate errors
    #[arg(long)]
    pub ignore_https_errors: bool,

    /// Browser locale (e.g. fr-FR)
    #[arg(long)]
    pub locale: Option<String>,

    /// Browser timezone (e.g. Europe/Paris)
    #[arg(long)]
    pub timezone_id: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

impl ScenarioArgs {
    pub fn request(&self) -> ScenarioRequest {
        let mut options = ScenarioOptions::new()
            .use_adblock(self.use_adblock)
            .ignore_https_errors(self.ignore_https_errors);
        if let Some(locale) = &self.locale {
            options = options.locale(locale);
        }
        if let Some(timezone_id) = &self.timezone_id {
            options = options.timezone_id(timezone_id);
        }
        ScenarioRequest::new(&self.scenario, &self.url).options(options)
    }

    pub fn print(&self, result: &ScenarioResult) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        }
        .context("Failed to serialize scenario result")?;
        println!("{}", json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scenario_args_to_request() {
        let cli = Cli::try_parse_from([
            "greenframe-container",
            "exec",
            "--scenario",
            "scenario.js",
            "--url",
            "https://example.com",
            "--ignore-https-errors",
            "--timezone-id",
            "Europe/Paris",
        ])
        .unwrap();

        let Commands::Exec(args) = cli.command else {
            panic!("Expected exec command");
        };
        let request = args.scenario.request();

        assert_eq!(request.scenario, "scenario.js");
        assert!(!request.options.use_adblock);
        assert!(request.options.ignore_https_errors);
        assert_eq!(request.options.locale, None);
        assert_eq!(request.options.timezone_id.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn test_global_container_args() {
        let cli = Cli::try_parse_from([
            "greenframe-container",
            "stop",
            "--runtime",
            "podman",
            "--container-name",
            "gf-test",
        ])
        .unwrap();

        assert_eq!(cli.container.runtime, Some(ContainerRuntime::Podman));
        assert_eq!(cli.container.settings().unwrap().name, "gf-test");
    }
}
