use std::time::Duration;

use soulpost_locator_registry::Locator;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::errors::SessionError;
use crate::policy::ComposeTimings;
use crate::ports::{ElementHandle, SessionPort};

/// How ready an element must be before the protocol touches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Present,
    Enabled,
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("{locator} never appeared within {waited:?}")]
    NeverPresent { locator: Locator, waited: Duration },
    #[error("{locator} stayed disabled for {waited:?}")]
    NeverEnabled { locator: Locator, waited: Duration },
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Poll until the first match of `locator` reaches `readiness`.
///
/// The poll interval starts at `readiness_poll` and doubles up to `readiness_poll_max`.
/// The session is always queried at least once, even with a zero timeout.
pub async fn await_element(
    session: &dyn SessionPort,
    locator: &Locator,
    readiness: Readiness,
    timeout: Duration,
    timings: &ComposeTimings,
) -> Result<ElementHandle, WaitError> {
    let deadline = Instant::now() + timeout;
    let mut interval = timings.readiness_poll();
    let cap = timings.readiness_poll_max();
    let mut seen = false;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match check_once(session, locator, readiness).await {
            Ok(Observed::Ready(element)) => {
                debug!(%locator, attempts, "element ready");
                return Ok(element);
            }
            Ok(Observed::Pending) => seen = true,
            Ok(Observed::Absent) => {}
            Err(err) => return Err(err.into()),
        }

        let now = Instant::now();
        if now >= deadline {
            let waited = timeout;
            return Err(if seen {
                WaitError::NeverEnabled {
                    locator: locator.clone(),
                    waited,
                }
            } else {
                WaitError::NeverPresent {
                    locator: locator.clone(),
                    waited,
                }
            });
        }

        let pause = interval.min(deadline - now);
        debug!(%locator, attempts, pause_ms = pause.as_millis() as u64, "element not ready");
        sleep(pause).await;
        interval = (interval * 2).min(cap);
    }
}

enum Observed {
    Absent,
    Pending,
    Ready(ElementHandle),
}

async fn check_once(
    session: &dyn SessionPort,
    locator: &Locator,
    readiness: Readiness,
) -> Result<Observed, SessionError> {
    let found = match session.query(locator).await {
        Ok(found) => found,
        Err(SessionError::NotFound(detail)) => {
            debug!(%locator, %detail, "lookup reported element missing");
            return Ok(Observed::Absent);
        }
        Err(err) => return Err(err),
    };
    let Some(element) = found.into_iter().next() else {
        return Ok(Observed::Absent);
    };
    if readiness == Readiness::Present {
        return Ok(Observed::Ready(element));
    }
    match session.is_enabled(&element).await {
        Ok(true) => Ok(Observed::Ready(element)),
        Ok(false) => Ok(Observed::Pending),
        // Re-rendered between lookup and check; the next poll resolves it again.
        Err(SessionError::NotFound(detail)) => {
            debug!(%locator, %detail, "element vanished during enabled check");
            Ok(Observed::Pending)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AppearsAfter {
        queries: AtomicU32,
        appear_at: u32,
        enabled_checks: AtomicU32,
        /// Enabled checks answered with `NotFound`, as a re-rendered node would be.
        vanish_checks: u32,
    }

    impl AppearsAfter {
        fn new(appear_at: u32) -> Self {
            Self {
                queries: AtomicU32::new(0),
                appear_at,
                enabled_checks: AtomicU32::new(0),
                vanish_checks: 0,
            }
        }
    }

    #[async_trait]
    impl SessionPort for AppearsAfter {
        async fn current_url(&self) -> Result<String, SessionError> {
            Ok(String::new())
        }
        async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<(), SessionError> {
            Ok(())
        }
        async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.appear_at {
                Ok(vec![ElementHandle::new(locator.clone(), 0)])
            } else {
                Ok(Vec::new())
            }
        }
        async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, SessionError> {
            let n = self.enabled_checks.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.vanish_checks {
                Err(SessionError::NotFound(element.locator.to_string()))
            } else {
                Ok(true)
            }
        }
        async fn click(&self, _element: &ElementHandle) -> Result<(), SessionError> {
            Ok(())
        }
        async fn type_text(&self, _e: &ElementHandle, _t: &str) -> Result<(), SessionError> {
            Ok(())
        }
        async fn upload(&self, _e: &ElementHandle, _p: &Path) -> Result<(), SessionError> {
            Ok(())
        }
        async fn select_value(&self, _e: &ElementHandle, _v: &str) -> Result<(), SessionError> {
            Ok(())
        }
        async fn screenshot(&self, _path: &Path) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_until_element_appears() {
        let session = AppearsAfter::new(4);
        let started = Instant::now();
        let locator = Locator::css("#late");
        let handle = await_element(
            &session,
            &locator,
            Readiness::Present,
            Duration::from_secs(10),
            &ComposeTimings::default(),
        )
        .await
        .unwrap();

        assert_eq!(handle.locator, locator);
        // 100 + 200 + 400 ms between the four queries
        assert_eq!(started.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_deadline() {
        let session = AppearsAfter::new(u32::MAX);
        let started = Instant::now();
        let err = await_element(
            &session,
            &Locator::css("#never"),
            Readiness::Present,
            Duration::from_millis(2_500),
            &ComposeTimings::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::NeverPresent { .. }));
        assert_eq!(started.elapsed(), Duration::from_millis(2_500));
    }

    #[tokio::test(start_paused = true)]
    async fn element_lost_during_enabled_check_is_polled_again() {
        let session = AppearsAfter {
            vanish_checks: 1,
            ..AppearsAfter::new(1)
        };
        let started = Instant::now();
        let handle = await_element(
            &session,
            &Locator::css("#submit"),
            Readiness::Enabled,
            Duration::from_secs(10),
            &ComposeTimings::default(),
        )
        .await
        .unwrap();

        assert_eq!(handle.index, 0);
        assert_eq!(session.enabled_checks.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn element_that_keeps_vanishing_times_out_as_disabled() {
        let session = AppearsAfter {
            vanish_checks: u32::MAX,
            ..AppearsAfter::new(1)
        };
        let err = await_element(
            &session,
            &Locator::css("#submit"),
            Readiness::Enabled,
            Duration::from_millis(1_500),
            &ComposeTimings::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::NeverEnabled { .. }));
        assert!(session.enabled_checks.load(Ordering::SeqCst) > 1);
    }
}
