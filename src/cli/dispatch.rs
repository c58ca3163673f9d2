use super::config::cmd_config;
use super::env::CliArgs;
use super::info::cmd_info;
use super::locators::cmd_locators;
use super::post::cmd_post;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Post(args) => cmd_post(args, ctx, &cli.output).await,
        Commands::Locators(args) => cmd_locators(args, ctx, &cli.output).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
        Commands::Info => cmd_info(ctx).await,
    }
}
