use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::errors::CdpSessionError;
use crate::session::ChromiumSession;

const BASE_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--disable-breakpad",
    "--disable-component-update",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-popup-blocking",
    "--disable-sync",
    "--no-first-run",
    "--no-default-browser-check",
    "--password-store=basic",
    "--use-mock-keychain",
];

/// Owns the browser process and the task pumping its DevTools connection.
pub struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserHandle {
    pub async fn close(mut self) -> Result<(), CdpSessionError> {
        let closed = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            warn!(error = %err, "browser process did not exit cleanly");
        }
        self.handler.abort();
        closed?;
        info!("browser closed");
        Ok(())
    }
}

fn browser_config(cfg: &CdpConfig) -> Result<BrowserConfig, CdpSessionError> {
    let executable = cfg
        .resolve_executable()
        .ok_or(CdpSessionError::ExecutableMissing)?;

    let (width, height) = cfg.window_size;
    let mut args: Vec<String> = BASE_ARGS.iter().map(|arg| arg.to_string()).collect();
    if cfg.headless {
        args.push("--headless=new".to_string());
        args.push("--hide-scrollbars".to_string());
        args.push("--mute-audio".to_string());
    }
    args.extend(cfg.extra_args.iter().cloned());

    let mut builder = BrowserConfig::builder()
        .chrome_executable(executable)
        .window_size(width, height)
        .launch_timeout(cfg.launch_timeout())
        .request_timeout(cfg.request_timeout())
        .args(args);
    if !cfg.headless {
        builder = builder.with_head();
    }
    if cfg.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(dir) = &cfg.user_data_dir {
        std::fs::create_dir_all(dir).map_err(|err| {
            CdpSessionError::Config(format!(
                "cannot create profile dir {}: {err}",
                dir.display()
            ))
        })?;
        builder = builder.user_data_dir(dir.clone());
    }

    builder.build().map_err(CdpSessionError::Config)
}

/// Launch Chromium, start the handler task and open a single page at `start_url`.
pub async fn launch(
    cfg: &CdpConfig,
    start_url: &str,
) -> Result<(ChromiumSession, BrowserHandle), CdpSessionError> {
    let config = browser_config(cfg)?;
    let (browser, mut events) = Browser::launch(config)
        .await
        .map_err(|err| CdpSessionError::Launch(err.to_string()))?;

    let handler = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let Err(err) = event {
                debug!(error = %err, "cdp handler event error");
            }
        }
        debug!("cdp handler stopped");
    });

    let page = match browser.new_page(start_url).await {
        Ok(page) => page,
        Err(err) => {
            let handle = BrowserHandle { browser, handler };
            if let Err(close_err) = handle.close().await {
                warn!(error = %close_err, "cleanup after failed page open");
            }
            return Err(err.into());
        }
    };

    info!(headless = cfg.headless, "browser launched");
    let session = ChromiumSession::new(page, cfg.network_quiet());
    Ok((session, BrowserHandle { browser, handler }))
}
