//! # greenframe_runner
//!
//! Scenario container lifecycle for GreenFrame.
//!
//! This crate manages the one disposable container a measurement scenario
//! runs in: create it with host, network and environment configuration,
//! start it, execute a scenario inside it and decode the structured output,
//! then stop it even when earlier steps failed.
//!
//! # Features
//!
//! - **Runtime Client**: Docker or Podman CLI behind the [`RuntimeClient`] trait
//! - **Idempotent Create**: Any previous container with the same name is removed first
//! - **Safe Stop**: Rename-then-stop, never fails the caller's cleanup
//! - **Env Forwarding**: Explicit names and env-file keys, values from the caller's environment
//! - **Mock Client**: For testing without a container daemon
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use greenframe_runner::{
//!     CliClient, CliClientOptions, ContainerManager, ContainerSettings, CreateRequest,
//!     EnvSnapshot, ScenarioRequest, ScriptHostIp,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ContainerSettings::new("/opt/greenframe");
//!     let client = CliClient::new(CliClientOptions::default()).await?;
//!     let host_ip = ScriptHostIp::new(settings.host_ip_script.clone());
//!
//!     let mut manager = ContainerManager::new(
//!         settings,
//!         Arc::new(client),
//!         Arc::new(host_ip),
//!         EnvSnapshot::from_process(),
//!     );
//!
//!     manager.create(&CreateRequest::new().extra_host("app.local")).await?;
//!     manager.start().await?;
//!     let result = manager
//!         .exec_scenario(&ScenarioRequest::new("scenario.js", "http://app.local"))
//!         .await;
//!     manager.stop().await;
//!
//!     println!("{} timeline(s)", result?.timelines.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod mock;
pub mod scenario;

pub use cli::{CliClient, CliClientOptions, ContainerRuntime};
pub use client::{CommandOutput, CreateSpec, RuntimeClient};
pub use config::{ContainerSettings, CreateRequest, HostBinding, CONTAINER_NAME};
pub use env::{read_env_file_names, resolve_env_bindings, EnvBinding, EnvSnapshot};
pub use error::{ContainerError, ContainerResult, EnvFileError, RuntimeError, RuntimeResult};
pub use host::{HostIpResolver, ScriptHostIp, StaticHostIp};
pub use lifecycle::{ContainerManager, LifecycleState, StopOutcome};
pub use mock::{CapturedCall, MockClient};
pub use scenario::{
    parse_scenario_output, ScenarioExecutor, ScenarioOptions, ScenarioRequest, ScenarioResult,
};
