//! Start command - Start the created container.

use anyhow::Result;
use clap::Args;

use super::ContainerArgs;

#[derive(Args, Debug, Clone)]
pub struct StartArgs {}

pub async fn execute(container: ContainerArgs, _args: StartArgs) -> Result<()> {
    let mut manager = container.manager().await?;
    manager.start().await?;
    println!("OK");
    Ok(())
}
