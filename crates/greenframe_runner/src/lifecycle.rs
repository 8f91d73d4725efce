//! Lifecycle of the scenario container.
//!
//! The manager owns the one named container: it creates it from scratch,
//! starts it, hands scenario runs to a [`ScenarioExecutor`] and stops it.
//! Operations take `&mut self`, so a single manager cannot overlap them.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{CreateSpec, RuntimeClient};
use crate::config::{ContainerSettings, CreateRequest, HostBinding};
use crate::env::{resolve_env_bindings, EnvBinding, EnvSnapshot};
use crate::error::{ContainerError, ContainerResult};
use crate::host::HostIpResolver;
use crate::scenario::{ScenarioExecutor, ScenarioRequest, ScenarioResult};

/// Lifecycle state as last observed by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Absent,
    Created,
    Running,
    Stopping,
}

/// Result of a best-effort stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotStopped(String),
}

impl StopOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Runtime messages meaning the container was not there to begin with.
const NOT_FOUND_MARKERS: &[&str] = &["no such container", "no container with name or id"];

fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Environment entries every container receives, ahead of forwarded ones.
pub fn builtin_env(host_ip: &str, extra_hosts: &[String]) -> Vec<EnvBinding> {
    let mut env = vec![EnvBinding::new("HOSTIP", host_ip)];
    if !extra_hosts.is_empty() {
        env.push(EnvBinding::new("EXTRA_HOSTS", extra_hosts.join(",")));
    }
    env
}

/// Hosts-file entries: `localhost` and every extra host alias the host IP.
pub fn host_bindings(host_ip: &str, extra_hosts: &[String]) -> Vec<HostBinding> {
    std::iter::once("localhost")
        .chain(extra_hosts.iter().map(String::as_str))
        .map(|host| HostBinding::new(host, host_ip))
        .collect()
}

/// Manages the single scenario container.
pub struct ContainerManager {
    settings: ContainerSettings,
    client: Arc<dyn RuntimeClient>,
    host_ip: Arc<dyn HostIpResolver>,
    env: EnvSnapshot,
    state: LifecycleState,
}

impl ContainerManager {
    pub fn new(
        settings: ContainerSettings,
        client: Arc<dyn RuntimeClient>,
        host_ip: Arc<dyn HostIpResolver>,
        env: EnvSnapshot,
    ) -> Self {
        Self {
            settings,
            client,
            host_ip,
            env,
            state: LifecycleState::Absent,
        }
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Build the create parameters for `request` against a resolved host IP.
    pub fn build_create_spec(&self, request: &CreateRequest, host_ip: &str) -> CreateSpec {
        let mut env = builtin_env(host_ip, &request.extra_hosts);
        env.extend(resolve_env_bindings(
            &request.env_names,
            request.env_file.as_deref(),
            &self.env,
        ));

        CreateSpec {
            name: self.settings.name.clone(),
            image: self.settings.image.clone(),
            env,
            hosts: host_bindings(host_ip, &request.extra_hosts),
            tty: true,
            auto_remove: true,
        }
    }

    /// Create the container from scratch.
    ///
    /// Any existing container with the same name is force-removed first.
    /// On success the application directory has been copied into it.
    pub async fn create(&mut self, request: &CreateRequest) -> ContainerResult<()> {
        let host_ip = self
            .host_ip
            .resolve()
            .await
            .map_err(|e| ContainerError::Creation(e.to_string()))?;

        let spec = self.build_create_spec(request, &host_ip);
        let name = self.settings.name.clone();
        info!(
            "Creating container {} with extra hosts: {:?}",
            name, request.extra_hosts
        );

        self.remove_existing().await?;
        self.state = LifecycleState::Absent;

        let created = self
            .client
            .create(&spec)
            .await
            .map_err(|e| ContainerError::Creation(e.to_string()))?;
        if !created.success() {
            return Err(ContainerError::Creation(created.failure_message()));
        }
        debug!("Container {} created", name);

        info!("Copying application files to container {}", name);
        let copy_result = self
            .client
            .copy_into(
                &self.settings.install_dir,
                &name,
                &self.settings.container_path,
            )
            .await;
        let copy_error = match copy_result {
            Ok(output) if output.success() => None,
            Ok(output) => Some(output.failure_message()),
            Err(e) => Some(e.to_string()),
        };

        if let Some(message) = copy_error {
            self.discard_half_created().await;
            return Err(ContainerError::Creation(message));
        }

        debug!("Files copied to container {}", name);
        self.state = LifecycleState::Created;
        Ok(())
    }

    async fn remove_existing(&self) -> ContainerResult<()> {
        let removed = self
            .client
            .remove(&self.settings.name, true)
            .await
            .map_err(|e| ContainerError::Creation(e.to_string()))?;

        if removed.success() || is_not_found(&removed.stderr) {
            Ok(())
        } else {
            Err(ContainerError::Creation(removed.failure_message()))
        }
    }

    async fn discard_half_created(&self) {
        match self.client.remove(&self.settings.name, true).await {
            Ok(output) if output.success() => {
                debug!("Removed half-created container {}", self.settings.name)
            }
            Ok(output) => warn!(
                "Could not remove half-created container {}: {}",
                self.settings.name,
                output.failure_message()
            ),
            Err(e) => warn!(
                "Could not remove half-created container {}: {}",
                self.settings.name, e
            ),
        }
    }

    /// Start the created container.
    ///
    /// Anything written to stderr counts as failure.
    pub async fn start(&mut self) -> ContainerResult<()> {
        let output = self
            .client
            .start(&self.settings.name)
            .await
            .map_err(|e| ContainerError::Start(e.to_string()))?;

        if output.has_diagnostics() {
            return Err(ContainerError::Start(output.stderr));
        }
        if !output.success() {
            return Err(ContainerError::Start(output.failure_message()));
        }

        info!("Container {} started", self.settings.name);
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Executor bound to this manager's container.
    pub fn executor(&self) -> ScenarioExecutor {
        ScenarioExecutor::new(Arc::clone(&self.client), self.settings.clone())
    }

    /// Run a scenario in the running container.
    pub async fn exec_scenario(
        &mut self,
        request: &ScenarioRequest,
    ) -> ContainerResult<ScenarioResult> {
        self.executor().run(request).await
    }

    /// Rename the container out of the way, then stop it.
    ///
    /// Stopping is asynchronous on the runtime side; the rename frees the
    /// canonical name at once so a following `create` does not collide with
    /// a container that is still shutting down.
    pub async fn try_stop(&mut self) -> ContainerResult<()> {
        let stopping_name = self.settings.stopping_name();

        let renamed = self
            .client
            .rename(&self.settings.name, &stopping_name)
            .await
            .map_err(|e| ContainerError::Stop(e.to_string()))?;
        if !renamed.success() {
            if is_not_found(&renamed.stderr) {
                self.state = LifecycleState::Absent;
            }
            return Err(ContainerError::Stop(renamed.failure_message()));
        }

        self.state = LifecycleState::Stopping;
        let stopped = self.client.stop(&stopping_name).await;
        self.state = LifecycleState::Absent;

        let stopped = stopped.map_err(|e| ContainerError::Stop(e.to_string()))?;
        if !stopped.success() {
            return Err(ContainerError::Stop(stopped.failure_message()));
        }

        info!("Container {} stopped", self.settings.name);
        Ok(())
    }

    /// Best-effort stop that never fails.
    pub async fn stop(&mut self) -> StopOutcome {
        match self.try_stop().await {
            Ok(()) => StopOutcome::Stopped,
            Err(e) => {
                // Usually the container is already gone.
                warn!("{}", e);
                StopOutcome::NotStopped(e.diagnostic().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_env_with_extra_hosts() {
        let env = builtin_env("172.17.0.1", &hosts(&["a.local", "b.local"]));
        assert_eq!(
            env,
            vec![
                EnvBinding::new("HOSTIP", "172.17.0.1"),
                EnvBinding::new("EXTRA_HOSTS", "a.local,b.local"),
            ]
        );
    }

    #[test]
    fn test_builtin_env_without_extra_hosts() {
        let env = builtin_env("172.17.0.1", &[]);
        assert_eq!(env, vec![EnvBinding::new("HOSTIP", "172.17.0.1")]);
    }

    #[test]
    fn test_host_bindings_preserve_order() {
        let bindings = host_bindings("10.0.0.1", &hosts(&["z.local", "a.local"]));
        let names: Vec<&str> = bindings.iter().map(|b| b.hostname.as_str()).collect();

        assert_eq!(names, vec!["localhost", "z.local", "a.local"]);
        assert!(bindings.iter().all(|b| b.ip == "10.0.0.1"));
    }

    #[test]
    fn test_not_found_markers() {
        assert!(is_not_found("Error: No such container: greenframe-runner\n"));
        assert!(is_not_found(
            "Error: no container with name or ID \"greenframe-runner\" found: no such container"
        ));
        assert!(!is_not_found("Cannot connect to the Docker daemon"));
    }

    #[test]
    fn test_stop_outcome() {
        assert!(StopOutcome::Stopped.is_stopped());
        assert!(!StopOutcome::NotStopped("gone".to_string()).is_stopped());
    }
}
