use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::infrastructure::pinning::PinningCredentials;
use crate::presentation::cli::context::AppContext;
use crate::presentation::cli::display::DisplayHelper;

/// Pinning service key pair
#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    /// Pinning service API key
    #[arg(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Pinning service secret API key
    #[arg(long, env = "PINATA_SECRET_API_KEY", hide_env_values = true)]
    pub secret_api_key: String,
}

impl CredentialArgs {
    pub fn credentials(&self) -> PinningCredentials {
        PinningCredentials::new(&self.api_key, &self.secret_api_key)
    }
}

/// Handler for the pin command
pub struct PinCommand {
    pub credentials: PinningCredentials,
}

impl PinCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let use_case = ctx.pin_workspace()?;

        let spinner = display.create_spinner(&format!("Pinning {}", ctx.tree.name));
        let result = use_case.execute(&self.credentials).await;
        spinner.finish_and_clear();
        let outcome = result?;

        display.success(&format!("Pinned {}", ctx.tree.name.bold()));
        println!("{}", outcome.identifier);
        if let Some(hash) = &outcome.remote_hash {
            display.print_indented(&format!("pinning service: {}", hash), 1);
        } else {
            display.warning("The pinning service did not store the workspace");
        }
        if let Some(cid) = &outcome.availability_cid {
            display.print_indented(&format!("primary source:  {}", cid), 1);
        }
        Ok(())
    }
}

/// Handler for the pins command
pub struct PinsCommand {
    pub credentials: PinningCredentials,
}

impl PinsCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let listing = ctx.pin_workspace()?.pin_list(&self.credentials).await?;
        println!("{}", serde_json::to_string_pretty(&listing)?);
        Ok(())
    }
}

/// Handler for the unpin command
pub struct UnpinCommand {
    pub hash: String,
    pub credentials: PinningCredentials,
}

impl UnpinCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let removed = ctx
            .pin_workspace()?
            .unpin(&self.credentials, &self.hash)
            .await?;

        if removed {
            display.success(&format!("Unpinned {}", self.hash));
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "The pinning service refused to unpin {}",
                self.hash.red()
            ))
        }
    }
}
