//! Create command - Create the scenario container from scratch.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use greenframe_runner::CreateRequest;

use super::ContainerArgs;

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Hostname resolving to the host machine inside the container (repeatable)
    #[arg(long = "extra-host", value_name = "HOST")]
    pub extra_hosts: Vec<String>,

    /// Environment variable forwarded from this process (repeatable)
    #[arg(short = 'e', long = "env", value_name = "NAME")]
    pub env_names: Vec<String>,

    /// Env file whose variable names are forwarded as well
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl CreateArgs {
    pub fn request(&self) -> CreateRequest {
        let request = CreateRequest::new()
            .extra_hosts(self.extra_hosts.clone())
            .env_names(self.env_names.clone());
        match &self.env_file {
            Some(path) => request.env_file(path),
            None => request,
        }
    }
}

pub async fn execute(container: ContainerArgs, args: CreateArgs) -> Result<()> {
    let mut manager = container.manager().await?;
    manager.create(&args.request()).await?;
    info!("Container {} created", manager.settings().name);
    Ok(())
}
