use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cdp_session::CdpConfig;
use serde::{Deserialize, Serialize};
use soulpost_locator_registry::LocatorRegistry;
use tool_compose_post::{ComposePolicy, ComposeTimings, DEFAULT_COMPOSE_URL};
use url::Url;

/// Application configuration, read from YAML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page hosting the composer
    pub compose_url: String,
    /// Locator document; the bundled twitter.com registry is used when unset
    pub locators_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    /// Exported session cookies installed before the first navigation
    pub cookies_path: Option<PathBuf>,
    pub browser: CdpConfig,
    pub timing: ComposeTimings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_url: DEFAULT_COMPOSE_URL.to_string(),
            locators_path: None,
            snapshot_path: Some(PathBuf::from("screenshot.png")),
            cookies_path: None,
            browser: CdpConfig::default(),
            timing: ComposeTimings::default(),
        }
    }
}

impl Config {
    pub fn compose_policy(&self) -> ComposePolicy {
        ComposePolicy {
            compose_url: self.compose_url.clone(),
            snapshot_path: self.snapshot_path.clone(),
            timings: self.timing.clone(),
        }
    }

    /// Load the registry from `override_path`, then `locators_path`, else the bundled default.
    pub fn load_registry(&self, override_path: Option<&Path>) -> Result<LocatorRegistry> {
        match override_path.or(self.locators_path.as_deref()) {
            Some(path) => LocatorRegistry::load(path)
                .with_context(|| format!("loading locators from {}", path.display())),
            None => LocatorRegistry::twitter_default().context("loading bundled locators"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_compose_url(&self.compose_url)?;
        self.load_registry(None)?;
        Ok(())
    }
}

/// Parse a compose surface URL, accepting only http(s).
pub fn check_compose_url(raw: &str) -> Result<Url> {
    let url =
        Url::parse(raw).with_context(|| format!("compose_url '{raw}' is not a valid URL"))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "compose_url must be http(s), got {}",
        url.scheme()
    );
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            "compose_url: https://x.com/home\ntiming:\n  per_char_delay_ms: 10\nbrowser:\n  headless: false\n",
        )
        .unwrap();
        assert_eq!(config.compose_url, "https://x.com/home");
        assert_eq!(config.timing.per_char_delay_ms, 10);
        assert_eq!(config.timing.submit_gap_ms, 500);
        assert!(!config.browser.headless);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("screenshot.png")));
    }

    #[test]
    fn policy_mirrors_config() {
        let config = Config {
            snapshot_path: None,
            ..Config::default()
        };
        let policy = config.compose_policy();
        assert_eq!(policy.compose_url, DEFAULT_COMPOSE_URL);
        assert!(policy.snapshot_path.is_none());
        assert_eq!(policy.timings, ComposeTimings::default());
    }

    #[test]
    fn rejects_non_http_compose_url() {
        let config = Config {
            compose_url: "file:///tmp/home".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn compose_url_check_accepts_only_http() {
        assert!(check_compose_url("https://x.com/home").is_ok());
        assert!(check_compose_url("http://localhost:8080/compose").is_ok());
        let err = check_compose_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("must be http(s)"));
        assert!(check_compose_url("not a url").is_err());
    }
}
