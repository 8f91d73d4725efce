//! Error types for the runner module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for runtime client operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Result type alias for container lifecycle operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors raised while talking to the container runtime itself.
///
/// A runtime command that runs but reports a failure is not an error at this
/// layer; it comes back as a [`CommandOutput`](crate::client::CommandOutput)
/// and the lifecycle manager decides what it means.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Container runtime not available: {0}")]
    NotAvailable(String),

    #[error("Host IP lookup failed: {0}")]
    HostIp(String),
}

/// Errors surfaced by the lifecycle manager and scenario executor.
///
/// Each variant carries the most specific diagnostic text available,
/// usually the runtime's stderr verbatim.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Container creation failed: {0}")]
    Creation(String),

    #[error("Container start failed: {0}")]
    Start(String),

    #[error("Scenario execution failed: {0}")]
    Scenario(String),

    #[error("Container stop failed: {0}")]
    Stop(String),
}

impl ContainerError {
    /// The diagnostic text carried by the error, without the kind prefix.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Creation(msg) | Self::Start(msg) | Self::Scenario(msg) | Self::Stop(msg) => msg,
        }
    }
}

/// Failure to read an environment-definition file.
#[derive(Error, Debug)]
#[error("Failed to read env file {path}: {source}")]
pub struct EnvFileError {
    pub path: PathBuf,
    #[source]
    pub source: dotenvy::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_is_exact_text() {
        let err = ContainerError::Start("Error response from daemon\n".to_string());
        assert_eq!(err.diagnostic(), "Error response from daemon\n");
        assert!(err.to_string().starts_with("Container start failed"));
    }
}
