use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;

/// Lifecycle of a single post composition.
///
/// `Idle -> Navigated -> Composing -> {MediaAttached | PollConfigured | NoAttachment}
/// -> ReadyToSubmit -> Submitted`, with `Failed` reachable from every
/// non-terminal state. No transition re-enters an earlier state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeState {
    Idle,
    Navigated,
    Composing,
    MediaAttached,
    PollConfigured,
    NoAttachment,
    ReadyToSubmit,
    Submitted,
    Failed(ErrorKind),
}

impl ComposeState {
    fn rank(&self) -> u8 {
        match self {
            ComposeState::Idle => 0,
            ComposeState::Navigated => 1,
            ComposeState::Composing => 2,
            ComposeState::MediaAttached
            | ComposeState::PollConfigured
            | ComposeState::NoAttachment => 3,
            ComposeState::ReadyToSubmit => 4,
            ComposeState::Submitted | ComposeState::Failed(_) => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ComposeState::Submitted | ComposeState::Failed(_))
    }

    pub fn can_advance_to(&self, next: &ComposeState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ComposeState::Failed(_) => true,
            ComposeState::Submitted => matches!(self, ComposeState::ReadyToSubmit),
            _ => next.rank() == self.rank() + 1,
        }
    }
}

impl fmt::Display for ComposeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeState::Idle => f.write_str("idle"),
            ComposeState::Navigated => f.write_str("navigated"),
            ComposeState::Composing => f.write_str("composing"),
            ComposeState::MediaAttached => f.write_str("media_attached"),
            ComposeState::PollConfigured => f.write_str("poll_configured"),
            ComposeState::NoAttachment => f.write_str("no_attachment"),
            ComposeState::ReadyToSubmit => f.write_str("ready_to_submit"),
            ComposeState::Submitted => f.write_str("submitted"),
            ComposeState::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Protocol steps, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeStep {
    Navigate,
    AwaitComposeReady,
    OpenComposer,
    InjectText,
    AttachMedia,
    ConfigurePoll,
    AwaitSubmitEnabled,
    Submit,
    Confirm,
}

impl ComposeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComposeStep::Navigate => "navigate",
            ComposeStep::AwaitComposeReady => "await_compose_ready",
            ComposeStep::OpenComposer => "open_composer",
            ComposeStep::InjectText => "inject_text",
            ComposeStep::AttachMedia => "attach_media",
            ComposeStep::ConfigurePoll => "configure_poll",
            ComposeStep::AwaitSubmitEnabled => "await_submit_enabled",
            ComposeStep::Submit => "submit",
            ComposeStep::Confirm => "confirm",
        }
    }
}

impl fmt::Display for ComposeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
