//! Exec command - Run a scenario in the running container.

use anyhow::Result;
use clap::Args;

use super::{ContainerArgs, ScenarioArgs};

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

pub async fn execute(container: ContainerArgs, args: ExecArgs) -> Result<()> {
    let mut manager = container.manager().await?;
    let result = manager.exec_scenario(&args.scenario.request()).await?;
    args.scenario.print(&result)
}
