//! Container configuration types.

use std::path::PathBuf;

/// Name of the one container managed per process.
pub const CONTAINER_NAME: &str = "greenframe-runner";

/// Suffix appended to the container name while it is being stopped.
pub const STOPPING_SUFFIX: &str = "-stopping";

/// Base image the scenario container is created from.
pub const BASE_IMAGE: &str = "mcr.microsoft.com/playwright:v1.30.0-focal";

/// Where the application directory is copied inside the container.
pub const CONTAINER_INSTALL_PATH: &str = "/greenframe";

/// Scenario runner script, relative to the in-container install path.
pub const RUNNER_SCRIPT: &str = "dist/runner/index.js";

/// Host IP discovery script, relative to the application install dir.
pub const HOST_IP_SCRIPT: &str = "dist/bash/getHostIP.sh";

/// A hostname registered in the container's hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBinding {
    pub hostname: String,
    pub ip: String,
}

impl HostBinding {
    pub fn new(hostname: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
        }
    }

    /// Render as the value of an `--add-host` flag.
    pub fn to_flag_value(&self) -> String {
        format!("{}:{}", self.hostname, self.ip)
    }
}

/// Settings for the managed scenario container.
#[derive(Debug, Clone)]
pub struct ContainerSettings {
    /// Container name
    pub name: String,
    /// Image reference, including tag
    pub image: String,
    /// Application directory copied into the container
    pub install_dir: PathBuf,
    /// Destination of the copy inside the container
    pub container_path: String,
    /// Interpreter used to launch the scenario runner
    pub interpreter: String,
    /// Host IP discovery script
    pub host_ip_script: PathBuf,
}

impl ContainerSettings {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        let install_dir = install_dir.into();
        Self {
            name: CONTAINER_NAME.to_string(),
            image: BASE_IMAGE.to_string(),
            host_ip_script: install_dir.join(HOST_IP_SCRIPT),
            install_dir,
            container_path: CONTAINER_INSTALL_PATH.to_string(),
            interpreter: "node".to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Name the container is renamed to while stopping.
    pub fn stopping_name(&self) -> String {
        format!("{}{}", self.name, STOPPING_SUFFIX)
    }

    /// Full in-container path of the scenario runner script.
    pub fn runner_entry(&self) -> String {
        format!(
            "{}/{}",
            self.container_path.trim_end_matches('/'),
            RUNNER_SCRIPT
        )
    }
}

/// Parameters for one `create` call.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    /// Hostnames aliased to the host machine inside the container
    pub extra_hosts: Vec<String>,
    /// Environment variables forwarded from the calling process
    pub env_names: Vec<String>,
    /// Optional env file whose keys are forwarded as well
    pub env_file: Option<PathBuf>,
}

impl CreateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extra_host(mut self, host: impl Into<String>) -> Self {
        self.extra_hosts.push(host.into());
        self
    }

    pub fn extra_hosts(mut self, hosts: Vec<String>) -> Self {
        self.extra_hosts = hosts;
        self
    }

    pub fn env_name(mut self, name: impl Into<String>) -> Self {
        self.env_names.push(name.into());
        self
    }

    pub fn env_names(mut self, names: Vec<String>) -> Self {
        self.env_names = names;
        self
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }
}
