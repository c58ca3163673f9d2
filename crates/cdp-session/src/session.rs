use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use soulpost_locator_registry::Locator;
use tokio::time::{sleep, timeout, Instant};
use tool_compose_post::{ElementHandle, SessionError, SessionPort};
use tracing::{debug, instrument};

use crate::cookies::StoredCookie;
use crate::errors::{session_error, CdpSessionError};

const READY_STATE_POLL: Duration = Duration::from_millis(100);

const IS_ENABLED_JS: &str = r#"function() {
    if (this.disabled) { return false; }
    return this.getAttribute('aria-disabled') !== 'true';
}"#;

/// `SessionPort` over a single Chromium page.
///
/// Handles are re-resolved on every call, so a re-rendered element is picked
/// up again instead of failing on a stale node.
#[derive(Clone, Debug)]
pub struct ChromiumSession {
    page: Page,
    quiet: Duration,
}

impl ChromiumSession {
    pub fn new(page: Page, quiet: Duration) -> Self {
        Self { page, quiet }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Install cookies into the browser; cookies without a domain are scoped to `fallback_url`.
    pub async fn import_cookies(
        &self,
        cookies: &[StoredCookie],
        fallback_url: &str,
    ) -> Result<(), CdpSessionError> {
        let params = cookies
            .iter()
            .map(|cookie| cookie.to_param(fallback_url))
            .collect::<Result<Vec<_>, _>>()?;
        if params.is_empty() {
            return Ok(());
        }
        let count = params.len();
        self.page.set_cookies(params).await?;
        debug!(count, "session cookies installed");
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>, CdpError> {
        let found = match locator {
            Locator::XPath(expr) => self.page.find_xpaths(expr.as_str()).await,
            Locator::Css(selector) => self.page.find_elements(selector.as_str()).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn resolve(&self, handle: &ElementHandle) -> Result<Element, SessionError> {
        let mut elements = self
            .find_all(&handle.locator)
            .await
            .map_err(|err| session_error(&handle.locator.to_string(), err))?;
        if handle.index < elements.len() {
            Ok(elements.swap_remove(handle.index))
        } else {
            Err(SessionError::NotFound(handle.locator.to_string()))
        }
    }

    async fn eval_bool(
        &self,
        element: &Element,
        function: &str,
        context: &str,
    ) -> Result<bool, SessionError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(|err| session_error(context, err))?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    async fn ready_state(&self) -> Result<String, String> {
        let evaluation = self
            .page
            .evaluate("document.readyState")
            .await
            .map_err(|err| err.to_string())?;
        evaluation
            .into_value::<String>()
            .map_err(|err| err.to_string())
    }
}

fn select_js(value: &str) -> String {
    // Embed the value as a JSON literal so quoting is handled by the encoder.
    let literal = serde_json::Value::String(value.to_string()).to_string();
    format!(
        r#"function() {{
    const value = {literal};
    const options = Array.from(this.options || []);
    if (!options.some((option) => option.value === value)) {{ return false; }}
    this.value = value;
    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}}"#
    )
}

#[async_trait]
impl SessionPort for ChromiumSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| session_error("current url", err))?;
        Ok(url.unwrap_or_default())
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn navigate(&self, url: &str, limit: Duration) -> Result<(), SessionError> {
        let deadline = Instant::now() + limit;
        match timeout(limit, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => return Err(session_error("navigate", err)),
            Err(_) => return Err(SessionError::Timeout(format!("navigation to {url}"))),
        }

        loop {
            match self.ready_state().await {
                Ok(state) if state == "complete" => break,
                Ok(state) => debug!(%state, "document not complete yet"),
                Err(err) => debug!(error = %err, "readyState probe failed"),
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout(format!("load of {url}")));
            }
            sleep(READY_STATE_POLL).await;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        sleep(self.quiet.min(remaining)).await;
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
        let elements = self
            .find_all(locator)
            .await
            .map_err(|err| session_error(&locator.to_string(), err))?;
        Ok((0..elements.len())
            .map(|index| ElementHandle::new(locator.clone(), index))
            .collect())
    }

    async fn is_enabled(&self, handle: &ElementHandle) -> Result<bool, SessionError> {
        let element = self.resolve(handle).await?;
        self.eval_bool(&element, IS_ENABLED_JS, "enabled check")
            .await
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), SessionError> {
        let element = self.resolve(handle).await?;
        element
            .click()
            .await
            .map_err(|err| session_error(&handle.locator.to_string(), err))?;
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<(), SessionError> {
        let element = self.resolve(handle).await?;
        let context = handle.locator.to_string();
        element
            .focus()
            .await
            .map_err(|err| session_error(&context, err))?;
        element
            .type_str(text)
            .await
            .map_err(|err| session_error(&context, err))?;
        Ok(())
    }

    async fn upload(&self, handle: &ElementHandle, path: &Path) -> Result<(), SessionError> {
        let element = self.resolve(handle).await?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|err| SessionError::Io(format!("{}: {err}", path.display())))?
                .join(path)
        };
        let params = SetFileInputFilesParams::builder()
            .file(absolute.to_string_lossy().into_owned())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(SessionError::Io)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| session_error("set file input", err))?;
        debug!(path = %absolute.display(), "file input populated");
        Ok(())
    }

    async fn select_value(&self, handle: &ElementHandle, value: &str) -> Result<(), SessionError> {
        let element = self.resolve(handle).await?;
        let context = handle.locator.to_string();
        if self.eval_bool(&element, &select_js(value), &context).await? {
            Ok(())
        } else {
            Err(SessionError::OptionNotFound {
                element: context,
                value: value.to_string(),
            })
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(|err| session_error("screenshot", err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_script_escapes_value() {
        let js = select_js("it's \"quoted\"");
        assert!(js.contains(r#"const value = "it's \"quoted\"";"#));
        assert!(js.starts_with("function() {"));
    }
}
