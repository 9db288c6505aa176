use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use crate::domain::value_objects::content_source::{ContentSource, SourceSlot};
use crate::presentation::cli::context::AppContext;
use crate::presentation::cli::display::DisplayHelper;

/// Source selector for the export command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Primary,
    User,
    Public,
}

impl From<SourceArg> for SourceSlot {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Primary => SourceSlot::Primary,
            SourceArg::User => SourceSlot::User,
            SourceArg::Public => SourceSlot::Public,
        }
    }
}

/// Handler for the export command
pub struct ExportCommand {
    pub source: SourceArg,
}

impl ExportCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let engine = ctx.sync_engine()?;
        let source = engine.sources().get(self.source.into()).clone();

        let spinner = display.create_spinner(&format!("Exporting to {}", source));
        let result = engine.export_tree(&ctx.tree.root, &source).await;
        spinner.finish_and_clear();
        let cid = result?;

        display.success(&format!("Exported {}", ctx.tree.name.bold()));
        println!("{}", cid);
        display.print_indented(&source.gateway_url(&cid).dimmed().to_string(), 1);
        Ok(())
    }
}

/// Handler for the import command
pub struct ImportCommand {
    pub cid: String,
    pub local_only: bool,
}

impl ImportCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let engine = ctx.sync_engine()?;

        let spinner = display.create_spinner(&format!("Importing {}", self.cid));
        let result = engine
            .import_all(&self.cid, self.local_only, &ctx.tree.root)
            .await;
        spinner.finish_and_clear();
        let outcome = result?;

        display.success(&format!(
            "Imported {} from {} source {}",
            self.cid,
            outcome.slot,
            outcome.source
        ));
        Ok(())
    }
}

/// Handler for the set-gateway command
pub struct SetGatewayCommand {
    pub endpoint: String,
}

impl SetGatewayCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let source = ContentSource::parse(&self.endpoint)?;

        let mut engine = ctx.sync_engine()?;
        let reachable = engine.set_user_source(source).await;

        let mut config = ctx.config.clone();
        config.sources = engine.sources().clone();
        ctx.config_store.save(&config).await?;

        if reachable {
            display.success(&format!("Gateway set to {}", config.sources.user));
        } else {
            display.warning(&format!(
                "Gateway set to {}, but it is not reachable",
                config.sources.user
            ));
        }
        Ok(())
    }
}
