//! Stop command - Rename and stop the container.
//!
//! Always exits successfully; a container that is already gone, or a
//! runtime that cannot be found, is reported on stdout instead.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use greenframe_runner::{ContainerManager, StopOutcome};

use super::ContainerArgs;

#[derive(Args, Debug, Clone)]
pub struct StopArgs {}

pub async fn execute(container: ContainerArgs, _args: StopArgs) -> Result<()> {
    match stop_outcome(container.manager().await).await {
        StopOutcome::Stopped => println!("OK"),
        StopOutcome::NotStopped(_) => println!("false"),
    }
    Ok(())
}

/// Stop through `manager`, folding a manager setup failure into `NotStopped`.
async fn stop_outcome(manager: Result<ContainerManager>) -> StopOutcome {
    match manager {
        Ok(mut manager) => manager.stop().await,
        Err(e) => {
            warn!("{:#}", e);
            StopOutcome::NotStopped(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::anyhow;
    use greenframe_runner::{ContainerSettings, EnvSnapshot, MockClient, StaticHostIp};

    fn mock_manager(client: &MockClient) -> ContainerManager {
        ContainerManager::new(
            ContainerSettings::new("/opt/greenframe"),
            Arc::new(client.clone()),
            Arc::new(StaticHostIp("172.17.0.1".to_string())),
            EnvSnapshot::default(),
        )
    }

    #[tokio::test]
    async fn test_missing_runtime_is_not_stopped() {
        let outcome = stop_outcome(Err(anyhow!("No container runtime found"))).await;
        assert_eq!(
            outcome,
            StopOutcome::NotStopped("No container runtime found".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_container_is_not_stopped() {
        let client = MockClient::new();
        let outcome = stop_outcome(Ok(mock_manager(&client))).await;

        assert!(!outcome.is_stopped());
        assert!(!client.was_called("stop"));
    }

    #[tokio::test]
    async fn test_running_container_is_stopped() {
        let client = MockClient::new().with_container("greenframe-runner", true);
        let outcome = stop_outcome(Ok(mock_manager(&client))).await;

        assert!(outcome.is_stopped());
        assert!(client.was_called("rename"));
    }
}
