#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use soulpost_locator_registry::{Locator, LocatorRegistry};
use tool_compose_post::{
    ComposeEngine, ComposePolicy, ElementHandle, MediaProbe, SessionError, SessionPort,
};

pub const COMPOSE_URL: &str = "https://twitter.com/home";

const REGISTRY: &str = r##"
compose_trigger: "#compose"
text_input: "#text"
submit_control: "#submit"
poll_trigger: "#poll"
poll_option_inputs: ["#choice1", "#choice2", "#choice3", "#choice4"]
poll_add_choice: ["#add-3", "#add-4"]
poll_duration:
  days: "#days"
  hours: "#hours"
  minutes: "#minutes"
"##;

pub const FILE_INPUT: &str = "input[type=\"file\"]";

pub fn registry() -> Arc<LocatorRegistry> {
    Arc::new(LocatorRegistry::from_yaml_str(REGISTRY).unwrap())
}

pub fn registry_with_confirmation() -> Arc<LocatorRegistry> {
    let raw = format!("{REGISTRY}submit_confirmation: \"#toast\"\n");
    Arc::new(LocatorRegistry::from_yaml_str(&raw).unwrap())
}

/// One recorded session interaction, keyed by locator expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CurrentUrl,
    Navigate(String),
    Query(String),
    IsEnabled(String),
    Click(String),
    Type(String, String),
    Upload(String, PathBuf),
    Select(String, String),
    Screenshot(PathBuf),
}

#[derive(Default)]
struct FakeState {
    url: String,
    calls: Vec<Call>,
    missing: HashSet<String>,
    disabled: HashSet<String>,
    enable_after: HashMap<String, u32>,
    enable_checks: HashMap<String, u32>,
    failing_clicks: HashMap<String, (u32, SessionError)>,
    clicks: HashMap<String, u32>,
    navigate_error: Option<SessionError>,
    screenshot_error: Option<SessionError>,
}

/// Scriptable in-memory page recording every call the engine makes.
#[derive(Clone, Default)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub fn at(url: &str) -> Self {
        let session = Self::default();
        session.state.lock().unwrap().url = url.to_string();
        session
    }

    pub fn blank() -> Self {
        Self::at("about:blank")
    }

    pub fn missing(self, expr: &str) -> Self {
        self.state.lock().unwrap().missing.insert(expr.to_string());
        self
    }

    pub fn disabled(self, expr: &str) -> Self {
        self.state.lock().unwrap().disabled.insert(expr.to_string());
        self
    }

    /// Report `expr` disabled for the first `checks` enabled checks.
    pub fn enabled_after(self, expr: &str, checks: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .enable_after
            .insert(expr.to_string(), checks);
        self
    }

    /// Fail the `nth` (1-based) click on `expr`.
    pub fn fail_click(self, expr: &str, nth: u32, err: SessionError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_clicks
            .insert(expr.to_string(), (nth, err));
        self
    }

    pub fn fail_navigation(self, err: SessionError) -> Self {
        self.state.lock().unwrap().navigate_error = Some(err);
        self
    }

    pub fn fail_screenshot(self, err: SessionError) -> Self {
        self.state.lock().unwrap().screenshot_error = Some(err);
        self
    }

    pub fn boxed(&self) -> Box<dyn SessionPort> {
        Box::new(self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    /// Every interaction except the read-only lookups.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::CurrentUrl | Call::Query(_) | Call::IsEnabled(_)
                )
            })
            .collect()
    }

    pub fn clicks_on(&self, expr: &str) -> usize {
        self.count(|call| matches!(call, Call::Click(e) if e == expr))
    }

    pub fn typed_into(&self, expr: &str) -> String {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Type(e, chunk) if e == expr => Some(chunk),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload(e, path) => Some((e, path)),
                _ => None,
            })
            .collect()
    }

    pub fn selections(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Select(e, value) => Some((e, value)),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> usize {
        self.count(|call| matches!(call, Call::Navigate(_)))
    }

    pub fn screenshots(&self) -> usize {
        self.count(|call| matches!(call, Call::Screenshot(_)))
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    /// Position of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(|call| pred(call))
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl SessionPort for FakeSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        self.record(Call::CurrentUrl);
        Ok(self.url())
    }

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), SessionError> {
        self.record(Call::Navigate(url.to_string()));
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.navigate_error.clone() {
            return Err(err);
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
        let expr = locator.expression().to_string();
        self.record(Call::Query(expr.clone()));
        if self.state.lock().unwrap().missing.contains(&expr) {
            Ok(Vec::new())
        } else {
            Ok(vec![ElementHandle::new(locator.clone(), 0)])
        }
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, SessionError> {
        let expr = element.locator.expression().to_string();
        self.record(Call::IsEnabled(expr.clone()));
        let mut state = self.state.lock().unwrap();
        if state.disabled.contains(&expr) {
            return Ok(false);
        }
        let checks = state.enable_checks.entry(expr.clone()).or_insert(0);
        *checks += 1;
        let seen = *checks;
        Ok(match state.enable_after.get(&expr) {
            Some(after) => seen > *after,
            None => true,
        })
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), SessionError> {
        let expr = element.locator.expression().to_string();
        self.record(Call::Click(expr.clone()));
        let mut state = self.state.lock().unwrap();
        let clicks = state.clicks.entry(expr.clone()).or_insert(0);
        *clicks += 1;
        let nth = *clicks;
        match state.failing_clicks.get(&expr) {
            Some((fail_at, err)) if *fail_at == nth => Err(err.clone()),
            _ => Ok(()),
        }
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), SessionError> {
        self.record(Call::Type(
            element.locator.expression().to_string(),
            text.to_string(),
        ));
        Ok(())
    }

    async fn upload(&self, element: &ElementHandle, path: &Path) -> Result<(), SessionError> {
        self.record(Call::Upload(
            element.locator.expression().to_string(),
            path.to_path_buf(),
        ));
        Ok(())
    }

    async fn select_value(
        &self,
        element: &ElementHandle,
        value: &str,
    ) -> Result<(), SessionError> {
        self.record(Call::Select(
            element.locator.expression().to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError> {
        self.record(Call::Screenshot(path.to_path_buf()));
        match self.state.lock().unwrap().screenshot_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Media probe answering from a fixed set of paths.
#[derive(Default)]
pub struct FakeProbe {
    existing: HashSet<PathBuf>,
}

impl FakeProbe {
    pub fn with(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            existing: paths.iter().map(PathBuf::from).collect(),
        })
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}

pub fn policy() -> ComposePolicy {
    ComposePolicy {
        compose_url: COMPOSE_URL.to_string(),
        ..ComposePolicy::default()
    }
}

pub fn engine(session: &FakeSession, registry: Arc<LocatorRegistry>) -> ComposeEngine {
    ComposeEngine::new(registry, session.boxed())
        .with_policy(policy())
        .with_probe(FakeProbe::with(&[
            "media/cat.png",
            "media/clip.MOV",
            "media/notes.pdf",
        ]))
}

pub fn choices(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
