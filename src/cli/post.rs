use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cdp_session::{launch, load_cookies, ChromiumSession};
use clap::Args;
use serde_json::json;
use soulpost_cli::check_compose_url;
use soulpost_locator_registry::LocatorRegistry;
use tokio::fs;
use tool_compose_post::{
    validate_request, ComposeEngine, ComposePolicy, FsMediaProbe, InteractionResult,
    PollDuration, PollSpec, PostDraft, PostRequest,
};
use tracing::{info, warn};

use crate::cli::context::CliContext;
use crate::cli::output::{emit, print_result, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct PostArgs {
    /// Post text
    #[arg(long)]
    pub text: Option<String>,

    /// Read the post from a JSON or YAML request file; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Image or video to attach
    #[arg(long, value_name = "PATH")]
    pub media: Option<PathBuf>,

    /// Poll choice, repeat for each choice in order
    #[arg(long = "poll-choice", value_name = "TEXT")]
    pub poll_choices: Vec<String>,

    #[arg(long)]
    pub poll_days: Option<u32>,

    #[arg(long)]
    pub poll_hours: Option<u32>,

    #[arg(long)]
    pub poll_minutes: Option<u32>,

    /// Wait after attaching media before submitting, in milliseconds
    #[arg(long, value_name = "MS")]
    pub attachment_settle_ms: Option<u64>,

    /// Exported session cookies (JSON array)
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    pub compose_url: Option<String>,

    /// Locator document overriding the configured one
    #[arg(long, value_name = "FILE")]
    pub locators: Option<PathBuf>,

    /// Validate the request and stop before launching the browser
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn cmd_post(args: PostArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let config = ctx.config();
    let draft = build_draft(&args).await?;
    let request = PostRequest::try_from(draft).context("Invalid post request")?;

    let registry = Arc::new(config.load_registry(args.locators.as_deref())?);
    validate_request(&request, &registry, &FsMediaProbe)
        .await
        .context("Post rejected before launching the browser")?;
    if let Some(url) = &args.compose_url {
        check_compose_url(url).context("Invalid --compose-url")?;
    }

    if args.dry_run {
        let summary = json!({
            "valid": true,
            "attachment": request.attachment.kind(),
            "text_chars": request.text.chars().count(),
        });
        return emit(output, &summary, |_| {
            println!(
                "Post request is valid (attachment: {})",
                request.attachment.kind()
            )
        });
    }

    let mut policy = config.compose_policy();
    if let Some(url) = &args.compose_url {
        policy.compose_url = url.clone();
    }

    let mut browser = config.browser.clone().with_env_overrides();
    if args.headful {
        browser.headless = false;
    }
    if let Some(chrome) = &args.chrome {
        browser.executable = Some(chrome.clone());
    }

    let (session, handle) = launch(&browser, "about:blank")
        .await
        .context("Failed to launch browser")?;
    let cookies = args.cookies.as_ref().or(config.cookies_path.as_ref());
    let outcome = run_post(session, registry, policy, request, cookies).await;
    if let Err(err) = handle.close().await {
        warn!(error = %err, "browser shutdown failed");
    }

    let result = outcome?;
    emit(output, &result, print_result)?;
    if !result.ok {
        match &result.failure {
            Some(failure) => bail!("Post failed: {}", failure),
            None => bail!("Post failed in state {}", result.state),
        }
    }
    Ok(())
}

async fn run_post(
    session: ChromiumSession,
    registry: Arc<LocatorRegistry>,
    policy: ComposePolicy,
    request: PostRequest,
    cookies: Option<&PathBuf>,
) -> Result<InteractionResult> {
    if let Some(path) = cookies {
        let stored = load_cookies(path).await?;
        session
            .import_cookies(&stored, &policy.compose_url)
            .await
            .context("Failed to install session cookies")?;
        info!(count = stored.len(), "session cookies imported");
    }

    let mut engine = ComposeEngine::new(registry, Box::new(session)).with_policy(policy);
    let result = engine.submit(request).await?;
    Ok(result)
}

/// Merge the request file (if any) with the command-line flags.
async fn build_draft(args: &PostArgs) -> Result<PostDraft> {
    let mut draft = match &args.request {
        Some(path) => read_request_file(path).await?,
        None => PostDraft::default(),
    };

    if let Some(text) = &args.text {
        draft.text = text.clone();
    }
    if let Some(media) = &args.media {
        draft.media = Some(media.clone());
    }
    if !args.poll_choices.is_empty() {
        let duration = draft
            .poll
            .as_ref()
            .map(|poll| poll.duration)
            .unwrap_or_default();
        draft.poll = Some(PollSpec {
            choices: args.poll_choices.clone(),
            duration,
        });
    }

    let duration_flags = args.poll_days.is_some()
        || args.poll_hours.is_some()
        || args.poll_minutes.is_some();
    if duration_flags {
        let Some(poll) = draft.poll.as_mut() else {
            bail!("--poll-days/--poll-hours/--poll-minutes need poll choices");
        };
        poll.duration = PollDuration {
            days: args.poll_days.unwrap_or(poll.duration.days),
            hours: args.poll_hours.unwrap_or(poll.duration.hours),
            minutes: args.poll_minutes.unwrap_or(poll.duration.minutes),
        };
    }

    if let Some(settle) = args.attachment_settle_ms {
        draft.attachment_settle_timeout_ms = Some(settle);
    }
    Ok(draft)
}

async fn read_request_file(path: &Path) -> Result<PostDraft> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let draft = if is_json {
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(draft)
}
