use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CdpSessionError;

/// Cookie as exported by common browser tooling (`page.cookies()` JSON dumps).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Seconds since the epoch; zero or negative marks a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl StoredCookie {
    /// Build the DevTools parameter; `fallback_url` scopes cookies without a domain.
    pub fn to_param(&self, fallback_url: &str) -> Result<CookieParam, CdpSessionError> {
        let mut builder = CookieParam::builder()
            .name(self.name.clone())
            .value(self.value.clone())
            .http_only(self.http_only)
            .secure(self.secure);

        match &self.domain {
            Some(domain) => builder = builder.domain(domain.clone()),
            None => builder = builder.url(fallback_url.to_string()),
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(expires) = self.expires.filter(|secs| *secs > 0.0) {
            builder = builder.expires(TimeSinceEpoch::new(expires));
        }
        if let Some(same_site) = self.same_site.as_deref().and_then(parse_same_site) {
            builder = builder.same_site(same_site);
        }

        builder
            .build()
            .map_err(|err| CdpSessionError::CookieFormat(format!("{}: {err}", self.name)))
    }
}

fn parse_same_site(raw: &str) -> Option<CookieSameSite> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Some(CookieSameSite::Strict),
        "lax" => Some(CookieSameSite::Lax),
        "none" | "no_restriction" => Some(CookieSameSite::None),
        _ => None,
    }
}

pub fn parse_cookies(raw: &str) -> Result<Vec<StoredCookie>, CdpSessionError> {
    serde_json::from_str(raw).map_err(|err| CdpSessionError::CookieFormat(err.to_string()))
}

pub async fn load_cookies(path: &Path) -> Result<Vec<StoredCookie>, CdpSessionError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CdpSessionError::CookieFile {
            path: path.to_path_buf(),
            source,
        })?;
    let cookies = parse_cookies(&raw)?;
    debug!(path = %path.display(), count = cookies.len(), "loaded session cookies");
    Ok(cookies)
}
