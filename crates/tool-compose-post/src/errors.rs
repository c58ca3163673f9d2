use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::ComposeStep;

/// Stable failure taxonomy shared by precondition errors and mid-protocol failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    InvalidAttachment,
    InvalidPollChoices,
    AmbiguousAttachment,
    AttachmentInputMissing,
    ElementNotFound,
    ReadinessTimeout,
    SubmitControlMissing,
    SessionIo,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::InvalidAttachment => "invalid_attachment",
            ErrorKind::InvalidPollChoices => "invalid_poll_choices",
            ErrorKind::AmbiguousAttachment => "ambiguous_attachment",
            ErrorKind::AttachmentInputMissing => "attachment_input_missing",
            ErrorKind::ElementNotFound => "element_not_found",
            ErrorKind::ReadinessTimeout => "readiness_timeout",
            ErrorKind::SubmitControlMissing => "submit_control_missing",
            ErrorKind::SessionIo => "session_io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejections raised before any UI interaction takes place.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("post text is empty")]
    EmptyText,
    #[error("invalid attachment {}: {reason}", path.display())]
    InvalidAttachment { path: PathBuf, reason: String },
    #[error("poll needs between {min} and {max} choices, got {got}")]
    InvalidPollChoices { got: usize, min: usize, max: usize },
    #[error("a post carries either media or a poll, not both")]
    AmbiguousAttachment,
}

impl ComposeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComposeError::EmptyText => ErrorKind::InvalidRequest,
            ComposeError::InvalidAttachment { .. } => ErrorKind::InvalidAttachment,
            ComposeError::InvalidPollChoices { .. } => ErrorKind::InvalidPollChoices,
            ComposeError::AmbiguousAttachment => ErrorKind::AmbiguousAttachment,
        }
    }
}

/// Mid-protocol failure carried inside a failed `InteractionResult`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeFailure {
    pub kind: ErrorKind,
    pub step: ComposeStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ComposeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.element {
            Some(element) => write!(
                f,
                "{} during {} ({}): {}",
                self.kind, self.step, element, self.message
            ),
            None => write!(f, "{} during {}: {}", self.kind, self.step, self.message),
        }
    }
}

/// Errors reported by a `SessionPort` implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("option '{value}' not available in {element}")]
    OptionNotFound { element: String, value: String },
    #[error("session operation timed out: {0}")]
    Timeout(String),
    #[error("session i/o failure: {0}")]
    Io(String),
    #[error("unsupported by session: {0}")]
    Unsupported(String),
}
