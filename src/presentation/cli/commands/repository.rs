use anyhow::Result;
use chrono::{Local, TimeZone};
use colored::Colorize;

use crate::application::use_cases::checkout::CheckoutUseCase;
use crate::application::use_cases::clone_repository::{
    CloneRepositoryConfig, CloneRepositoryUseCase,
};
use crate::application::use_cases::resolve_submodules::ResolveSubmodulesUseCase;
use crate::domain::value_objects::git_url::GitUrl;
use crate::infrastructure::vcs::{CheckoutOptions, GitAuth, LogOptions};
use crate::presentation::cli::context::AppContext;
use crate::presentation::cli::display::DisplayHelper;

/// Handler for the clone command
pub struct CloneCommand {
    pub url: String,
    pub depth: Option<u32>,
    pub branch: Option<String>,
    pub single_branch: bool,
    pub token: Option<String>,
}

impl CloneCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let mut config = CloneRepositoryConfig::new(&self.url)
            .with_depth(self.depth.unwrap_or(ctx.config.clone_depth))
            .with_single_branch(self.single_branch);
        if let Some(branch) = &self.branch {
            config = config.with_branch(branch);
        }
        if let Some(token) = &self.token {
            config = config.with_auth(GitAuth::new(token));
        }

        let spinner = display.create_spinner(&format!("Cloning {}", GitUrl::redact(&self.url)));
        let result = CloneRepositoryUseCase::new(ctx.vcs.clone(), ctx.quota())
            .execute(&ctx.tree, &config)
            .await;
        spinner.finish_and_clear();
        result?;

        display.success(&format!("Cloned into {}", ctx.tree.root.display()));
        Ok(())
    }
}

/// Handler for the checkout command
pub struct CheckoutCommand {
    pub reference: String,
    pub force: bool,
    pub remote: Option<String>,
}

impl CheckoutCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let options = CheckoutOptions {
            reference: self.reference.clone(),
            force: self.force,
            remote: self.remote.clone(),
        };

        let report = CheckoutUseCase::new(ctx.fs.clone(), ctx.repository())
            .execute(&options)
            .await?;

        display.success(&format!("Checked out {}", self.reference.blue()));
        for module in &report.removed {
            display.print_indented(
                &format!("{} {} ({})", "-".red(), module.name, module.path),
                1,
            );
        }
        Ok(())
    }
}

/// Handler for the submodules command
pub struct SubmodulesCommand {
    pub token: Option<String>,
}

impl SubmodulesCommand {
    pub async fn execute(&self, ctx: &AppContext, display: &DisplayHelper) -> Result<()> {
        let auth = self.token.as_ref().map(GitAuth::new);

        let spinner = display.create_spinner("Resolving submodules");
        let result = ResolveSubmodulesUseCase::new(ctx.fs.clone(), ctx.vcs.clone(), ctx.quota())
            .execute(&ctx.tree.root, auth.as_ref())
            .await;
        spinner.finish_and_clear();
        let report = result?;

        for resolved in &report.resolved {
            display.print_indented(
                &format!("{} {} -> {}", "✓".green(), resolved.module.name, resolved.directory),
                1,
            );
        }
        for failure in &report.failures {
            display.print_indented(
                &format!(
                    "{} {} -> {}: {}",
                    "✗".red(),
                    failure.module.name,
                    failure.directory,
                    failure.kind
                ),
                1,
            );
        }

        if report.is_success() {
            display.success(&format!(
                "Resolved {} submodules",
                report.resolved.len()
            ));
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} of {} submodules failed",
                report.failures.len(),
                report.total_modules()
            ))
        }
    }
}

/// Handler for the log command
pub struct LogCommand {
    pub max_count: Option<usize>,
}

impl LogCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let options = LogOptions {
            depth: self.max_count,
            ..Default::default()
        };

        for commit in ctx.repository().log(&options).await? {
            let short = commit.oid.get(..7).unwrap_or(commit.oid.as_str());
            let date = Local
                .timestamp_opt(commit.committer.timestamp, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let summary = commit.message.lines().next().unwrap_or_default();
            println!("{} {} {}", short.yellow(), date.dimmed(), summary);
        }
        Ok(())
    }
}

/// Handler for the branches command
pub struct BranchesCommand;

impl BranchesCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let repository = ctx.repository();
        let current = repository.current_branch().await;

        for branch in repository.branches().await {
            match &branch.remote {
                Some(remote) => println!("  {}", format!("{}/{}", remote, branch.name).red()),
                None if branch.name == current => println!("* {}", branch.name.green()),
                None => println!("  {}", branch.name),
            }
        }
        Ok(())
    }
}
