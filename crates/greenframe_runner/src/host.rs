//! Host IP discovery.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Source of the host machine's IP as seen from inside a container.
#[async_trait]
pub trait HostIpResolver: Send + Sync {
    async fn resolve(&self) -> RuntimeResult<String>;
}

/// Runs a helper script whose sole output is the host IP.
#[derive(Debug, Clone)]
pub struct ScriptHostIp {
    script: PathBuf,
}

impl ScriptHostIp {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[async_trait]
impl HostIpResolver for ScriptHostIp {
    async fn resolve(&self) -> RuntimeResult<String> {
        debug!("Resolving host IP with {}", self.script.display());

        let output = Command::new(&self.script)
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                program: self.script.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RuntimeError::HostIp(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        parse_host_ip(&String::from_utf8_lossy(&output.stdout))
    }
}

/// A host IP known up front.
#[derive(Debug, Clone)]
pub struct StaticHostIp(pub String);

#[async_trait]
impl HostIpResolver for StaticHostIp {
    async fn resolve(&self) -> RuntimeResult<String> {
        parse_host_ip(&self.0)
    }
}

/// Trim trailing whitespace and reject empty output.
pub fn parse_host_ip(raw: &str) -> RuntimeResult<String> {
    let ip = raw.trim_end();
    if ip.is_empty() {
        return Err(RuntimeError::HostIp("empty output".to_string()));
    }
    Ok(ip.to_string())
}
