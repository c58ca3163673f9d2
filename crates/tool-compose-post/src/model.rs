use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ComposeError, ComposeFailure};
use crate::precheck::mime_for_path;
use crate::state::{ComposeState, ComposeStep};

/// A post to compose and submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostRequest {
    pub text: String,
    pub attachment: Attachment,
    /// Overrides the policy's attachment settle interval for this request.
    pub attachment_settle: Option<Duration>,
}

impl PostRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: Attachment::None,
            attachment_settle: None,
        }
    }

    pub fn with_media(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Attachment::Media(MediaAttachment::new(path));
        self
    }

    pub fn with_poll(mut self, choices: Vec<String>, duration: PollDuration) -> Self {
        self.attachment = Attachment::Poll(PollSpec { choices, duration });
        self
    }

    pub fn with_attachment_settle(mut self, settle: Duration) -> Self {
        self.attachment_settle = Some(settle);
        self
    }
}

/// At most one attachment per post.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    None,
    Media(MediaAttachment),
    Poll(PollSpec),
}

impl Attachment {
    pub fn kind(&self) -> &'static str {
        match self {
            Attachment::None => "none",
            Attachment::Media(_) => "media",
            Attachment::Poll(_) => "poll",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaAttachment {
    pub path: PathBuf,
    pub mime_hint: Option<String>,
}

impl MediaAttachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_hint = mime_for_path(&path).map(str::to_string);
        Self { path, mime_hint }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSpec {
    pub choices: Vec<String>,
    #[serde(default)]
    pub duration: PollDuration,
}

/// Poll length as selected in the three duration selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl Default for PollDuration {
    fn default() -> Self {
        Self {
            days: 1,
            hours: 0,
            minutes: 0,
        }
    }
}

/// Wire form of a post, as read from request files or built from CLI flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollSpec>,
    #[serde(
        default,
        alias = "attachmentSettleTimeoutMs",
        skip_serializing_if = "Option::is_none"
    )]
    pub attachment_settle_timeout_ms: Option<u64>,
}

impl TryFrom<PostDraft> for PostRequest {
    type Error = ComposeError;

    fn try_from(draft: PostDraft) -> Result<Self, Self::Error> {
        let attachment = match (draft.media, draft.poll) {
            (Some(_), Some(_)) => return Err(ComposeError::AmbiguousAttachment),
            (Some(path), None) => Attachment::Media(MediaAttachment::new(path)),
            (None, Some(poll)) => Attachment::Poll(poll),
            (None, None) => Attachment::None,
        };
        Ok(PostRequest {
            text: draft.text,
            attachment,
            attachment_settle: draft.attachment_settle_timeout_ms.map(Duration::from_millis),
        })
    }
}

/// Timing of one protocol step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: ComposeStep,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

/// Outcome of one `submit` call that got past preconditions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionResult {
    pub post_id: Uuid,
    pub ok: bool,
    pub state: ComposeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ComposeFailure>,
    /// `None` when no confirmation locator is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub latency_ms: u64,
}

impl InteractionResult {
    pub fn new(post_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            post_id,
            ok: false,
            state: ComposeState::Idle,
            failure: None,
            confirmed: None,
            steps: Vec::new(),
            started_at: now,
            finished_at: now,
            latency_ms: 0,
        }
    }

    pub fn finish(mut self, latency: Duration) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = latency.as_millis() as u64;
        self
    }

    pub fn step(&self, step: ComposeStep) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.step == step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_with_media_and_poll_is_ambiguous() {
        let draft = PostDraft {
            text: "hi".into(),
            media: Some("cat.png".into()),
            poll: Some(PollSpec {
                choices: vec!["a".into(), "b".into()],
                duration: PollDuration::default(),
            }),
            attachment_settle_timeout_ms: None,
        };
        let err = PostRequest::try_from(draft).unwrap_err();
        assert!(matches!(err, ComposeError::AmbiguousAttachment));
    }

    #[test]
    fn draft_accepts_camel_case_settle() {
        let draft: PostDraft = serde_json::from_str(
            r#"{"text":"hello","media":"clip.MP4","attachmentSettleTimeoutMs":2500}"#,
        )
        .unwrap();
        let request = PostRequest::try_from(draft).unwrap();
        assert_eq!(request.attachment_settle, Some(Duration::from_millis(2500)));
        match request.attachment {
            Attachment::Media(media) => {
                assert_eq!(media.mime_hint.as_deref(), Some("video/mp4"));
            }
            other => panic!("unexpected attachment {other:?}"),
        }
    }

    #[test]
    fn poll_duration_defaults_to_one_day() {
        let draft: PostDraft =
            serde_json::from_str(r#"{"text":"vote","poll":{"choices":["x","y"]}}"#).unwrap();
        let request = PostRequest::try_from(draft).unwrap();
        assert_eq!(
            request.attachment,
            Attachment::Poll(PollSpec {
                choices: vec!["x".into(), "y".into()],
                duration: PollDuration {
                    days: 1,
                    hours: 0,
                    minutes: 0
                },
            })
        );
    }
}
