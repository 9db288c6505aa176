use anyhow::Result;

use crate::presentation::cli::context::AppContext;
use crate::presentation::cli::display::DisplayHelper;

/// Handler for the usage command
pub struct UsageCommand;

impl UsageCommand {
    pub fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let quota = ctx.quota();
        let used = quota.usage_kb()?;

        println!("{:.2} KB used of {:.2} KB", used, quota.threshold_kb());
        if used > quota.threshold_kb() {
            display.warning("Local storage is full; clone, submodules and import are blocked");
        }
        Ok(())
    }
}

/// Handler for the set-item command
pub struct SetItemCommand {
    pub key: String,
    pub value: String,
}

impl SetItemCommand {
    pub fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        if !ctx.settings_service().set_item(&self.key, &self.value) {
            return Err(anyhow::anyhow!("Failed to store '{}'", self.key));
        }
        display.success(&format!("Stored '{}'", self.key));
        Ok(())
    }
}

/// Handler for the get-item command
pub struct GetItemCommand {
    pub key: String,
}

impl GetItemCommand {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        match ctx.settings_service().get_item(&self.key) {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(anyhow::anyhow!("No value stored for '{}'", self.key)),
        }
    }
}
