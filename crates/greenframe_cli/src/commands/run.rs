//! Run command - Full scenario run with guaranteed cleanup.
//!
//! Creates and starts the container, runs one scenario, then stops the
//! container whatever happened before.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use greenframe_runner::{ContainerManager, ContainerResult, ScenarioRequest, ScenarioResult};

use super::create::CreateArgs;
use super::{ContainerArgs, ScenarioArgs};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub create: CreateArgs,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

async fn run_scenario(
    manager: &mut ContainerManager,
    args: &RunArgs,
    request: &ScenarioRequest,
) -> ContainerResult<ScenarioResult> {
    manager.create(&args.create.request()).await?;
    manager.start().await?;
    manager.exec_scenario(request).await
}

pub async fn execute(container: ContainerArgs, args: RunArgs) -> Result<()> {
    let mut manager = container.manager().await?;
    let request = args.scenario.request();

    let result = run_scenario(&mut manager, &args, &request).await;

    let outcome = manager.stop().await;
    if outcome.is_stopped() {
        info!("Container {} cleaned up", manager.settings().name);
    } else {
        warn!("Container {} was not stopped", manager.settings().name);
    }

    args.scenario.print(&result?)
}
