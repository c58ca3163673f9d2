use clap::Subcommand;

use super::config::ConfigArgs;
use super::locators::LocatorsArgs;
use super::post::PostArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Compose and submit a post
    Post(PostArgs),

    /// Inspect or check the locator registry
    Locators(LocatorsArgs),

    /// Manage SoulPost configuration
    Config(ConfigArgs),

    /// Show version and environment information
    Info,
}
