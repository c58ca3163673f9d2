use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use which::which;

pub const CHROME_ENV: &str = "SOULPOST_CHROME";
pub const HEADLESS_ENV: &str = "SOULPOST_HEADLESS";

/// Browser launch knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    /// Chromium binary; discovered on `PATH` and in the usual install locations when unset.
    pub executable: Option<PathBuf>,
    /// Persistent profile directory; a throwaway profile is used when unset.
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub launch_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Quiet window observed after a navigation reports `complete`.
    pub network_quiet_ms: u64,
    pub no_sandbox: bool,
    pub extra_args: Vec<String>,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            executable: None,
            user_data_dir: None,
            headless: true,
            window_size: (1920, 1080),
            launch_timeout_ms: 20_000,
            request_timeout_ms: 30_000,
            network_quiet_ms: 500,
            no_sandbox: false,
            extra_args: Vec::new(),
        }
    }
}

impl CdpConfig {
    /// Apply `SOULPOST_CHROME` and `SOULPOST_HEADLESS` on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = env::var(CHROME_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.executable = Some(PathBuf::from(trimmed));
            }
        }
        if let Ok(raw) = env::var(HEADLESS_ENV) {
            if let Some(flag) = parse_flag(&raw) {
                self.headless = flag;
            }
        }
        self
    }

    /// Configured executable when it exists, otherwise whatever discovery finds.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        match &self.executable {
            Some(path) if path.exists() => Some(path.clone()),
            _ => detect_chrome_executable(),
        }
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn network_quiet(&self) -> Duration {
        Duration::from_millis(self.network_quiet_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Locate a Chromium-family browser: `SOULPOST_CHROME`, then `PATH`, then OS install paths.
pub fn detect_chrome_executable() -> Option<PathBuf> {
    let from_env = env::var(CHROME_ENV)
        .ok()
        .map(|raw| PathBuf::from(raw.trim()))
        .filter(|path| !path.as_os_str().is_empty() && path.exists());
    if from_env.is_some() {
        return from_env;
    }

    chrome_executable_names()
        .iter()
        .find_map(|name| which(name).ok())
        .or_else(|| {
            os_specific_chrome_paths()
                .into_iter()
                .find(|candidate| candidate.exists())
        })
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .map(PathBuf::from)
            .map(|root| root.join("Google/Chrome/Application/chrome.exe"))
            .collect()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/snap/bin/chromium"),
        ]
    }
}
