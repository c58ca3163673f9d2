use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use soulpost_locator_registry::LocatorRegistry;

use crate::cli::context::CliContext;
use crate::cli::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct LocatorsArgs {
    #[command(subcommand)]
    pub action: LocatorsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum LocatorsAction {
    /// List every locator of the active registry
    Show {
        /// Locator document to read instead of the configured one
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Parse and check a locator document
    Validate {
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct LocatorRow {
    name: String,
    flavour: &'static str,
    expression: String,
}

#[derive(Serialize)]
struct RegistrySummary {
    valid: bool,
    source: String,
    entries: usize,
    max_poll_options: usize,
}

pub async fn cmd_locators(
    args: LocatorsArgs,
    ctx: &CliContext,
    output: &OutputFormat,
) -> Result<()> {
    match args.action {
        LocatorsAction::Show { file } => {
            let registry = ctx.config().load_registry(file.as_deref())?;
            let rows: Vec<LocatorRow> = registry
                .entries()
                .into_iter()
                .map(|(name, locator)| LocatorRow {
                    name,
                    flavour: locator.flavour(),
                    expression: locator.expression().to_string(),
                })
                .collect();
            emit(output, &rows, |rows| {
                for row in rows {
                    println!("{:<26} {:<5} {}", row.name, row.flavour, row.expression);
                }
            })
        }
        LocatorsAction::Validate { file } => {
            let source = source_label(ctx, file.as_ref());
            let registry: LocatorRegistry = ctx.config().load_registry(file.as_deref())?;
            let summary = RegistrySummary {
                valid: true,
                source,
                entries: registry.entries().len(),
                max_poll_options: registry.max_poll_options(),
            };
            emit(output, &summary, |summary| {
                println!(
                    "Locator registry {} is valid ({} entries, polls up to {} choices)",
                    summary.source, summary.entries, summary.max_poll_options
                )
            })
        }
    }
}

fn source_label(ctx: &CliContext, file: Option<&PathBuf>) -> String {
    file.or(ctx.config().locators_path.as_ref())
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(bundled)".to_string())
}
