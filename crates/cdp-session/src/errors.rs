use std::path::PathBuf;

use chromiumoxide::error::CdpError;
use thiserror::Error;
use tool_compose_post::SessionError;

#[derive(Debug, Error)]
pub enum CdpSessionError {
    #[error("no Chromium executable found; set SOULPOST_CHROME or browser.executable")]
    ExecutableMissing,
    #[error("invalid browser configuration: {0}")]
    Config(String),
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error(transparent)]
    Cdp(#[from] CdpError),
    #[error("failed to read cookie file {path}: {source}")]
    CookieFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid cookie data: {0}")]
    CookieFormat(String),
}

/// Translate a DevTools error into the engine's session vocabulary.
pub(crate) fn session_error(context: &str, err: CdpError) -> SessionError {
    match err {
        CdpError::NotFound => SessionError::NotFound(context.to_string()),
        CdpError::Timeout => SessionError::Timeout(context.to_string()),
        other => SessionError::Io(format!("{context}: {other}")),
    }
}
