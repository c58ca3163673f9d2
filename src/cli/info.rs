use anyhow::Result;

use crate::cli::context::CliContext;

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();

    println!("SoulPost System Information");
    println!("===========================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE"));
    println!("Git Commit: {}", env!("GIT_HASH"));
    println!();

    println!("Configuration:");
    let present = if ctx.config_path().exists() {
        ""
    } else {
        " (not found, using defaults)"
    };
    println!("- Config File: {}{}", ctx.config_path().display(), present);
    println!("- Compose URL: {}", config.compose_url);
    match &config.locators_path {
        Some(path) => println!("- Locators: {}", path.display()),
        None => println!("- Locators: (bundled)"),
    }
    match &config.snapshot_path {
        Some(path) => println!("- Snapshot: {}", path.display()),
        None => println!("- Snapshot: disabled"),
    }
    let browser = config.browser.clone().with_env_overrides();
    println!("- Headless: {}", browser.headless);
    println!();

    match browser.resolve_executable() {
        Some(path) => println!("Chromium: {} ✓", path.display()),
        None => println!("Chromium: not found (set SOULPOST_CHROME or browser.executable)"),
    }

    Ok(())
}
