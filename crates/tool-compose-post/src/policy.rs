use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMPOSE_URL: &str = "https://twitter.com/home";

/// Engine view of the surface to post on, snapshot output and timings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposePolicy {
    pub compose_url: String,
    /// Screenshot target after submission or a mid-protocol failure; `None` disables snapshots.
    pub snapshot_path: Option<PathBuf>,
    pub timings: ComposeTimings,
}

impl Default for ComposePolicy {
    fn default() -> Self {
        Self {
            compose_url: DEFAULT_COMPOSE_URL.to_string(),
            snapshot_path: Some(PathBuf::from("screenshot.png")),
            timings: ComposeTimings::default(),
        }
    }
}

/// All protocol intervals, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeTimings {
    pub readiness_timeout_ms: u64,
    pub readiness_poll_ms: u64,
    pub readiness_poll_max_ms: u64,
    pub navigation_timeout_ms: u64,
    pub per_char_delay_ms: u64,
    pub attachment_settle_ms: u64,
    pub submit_gap_ms: u64,
    pub final_settle_ms: u64,
    pub confirmation_timeout_ms: u64,
}

impl ComposeTimings {
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn readiness_poll(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms.max(1))
    }

    pub fn readiness_poll_max(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_max_ms.max(self.readiness_poll_ms).max(1))
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn per_char_delay(&self) -> Duration {
        Duration::from_millis(self.per_char_delay_ms)
    }

    pub fn attachment_settle(&self) -> Duration {
        Duration::from_millis(self.attachment_settle_ms)
    }

    pub fn submit_gap(&self) -> Duration {
        Duration::from_millis(self.submit_gap_ms)
    }

    pub fn final_settle(&self) -> Duration {
        Duration::from_millis(self.final_settle_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}

impl Default for ComposeTimings {
    fn default() -> Self {
        Self {
            readiness_timeout_ms: 10_000,
            readiness_poll_ms: 100,
            readiness_poll_max_ms: 1_000,
            navigation_timeout_ms: 30_000,
            per_char_delay_ms: 30,
            attachment_settle_ms: 1_000,
            submit_gap_ms: 500,
            final_settle_ms: 500,
            confirmation_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_timings_keep_defaults() {
        let timings: ComposeTimings =
            serde_yaml::from_str("per_char_delay_ms: 5\nsubmit_gap_ms: 0\n").unwrap();
        assert_eq!(timings.per_char_delay(), Duration::from_millis(5));
        assert_eq!(timings.submit_gap(), Duration::ZERO);
        assert_eq!(timings.readiness_timeout(), Duration::from_secs(10));
        assert_eq!(timings.attachment_settle(), Duration::from_secs(1));
    }

    #[test]
    fn poll_cap_never_below_initial_interval() {
        let timings = ComposeTimings {
            readiness_poll_ms: 250,
            readiness_poll_max_ms: 100,
            ..ComposeTimings::default()
        };
        assert_eq!(timings.readiness_poll_max(), Duration::from_millis(250));
    }
}
