use std::path::Path;

use soulpost_locator_registry::{LocatorRegistry, DEFAULT_POLL_SLOTS};
use tracing::debug;

use crate::errors::ComposeError;
use crate::model::{Attachment, PostRequest};
use crate::ports::MediaProbe;

/// Accepted media extensions and their MIME types, matched case-insensitively.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
];

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    MEDIA_TYPES
        .iter()
        .find(|(allowed, _)| allowed.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Check everything that can be rejected without touching the UI.
pub async fn validate_request(
    request: &PostRequest,
    registry: &LocatorRegistry,
    probe: &dyn MediaProbe,
) -> Result<(), ComposeError> {
    if request.text.trim().is_empty() {
        return Err(ComposeError::EmptyText);
    }

    match &request.attachment {
        Attachment::None => {}
        Attachment::Media(media) => {
            if mime_for_path(&media.path).is_none() {
                return Err(ComposeError::InvalidAttachment {
                    path: media.path.clone(),
                    reason: "unsupported media type".to_string(),
                });
            }
            if !probe.exists(&media.path).await {
                return Err(ComposeError::InvalidAttachment {
                    path: media.path.clone(),
                    reason: "file does not exist".to_string(),
                });
            }
        }
        Attachment::Poll(poll) => {
            let max = registry.max_poll_options();
            let got = poll.choices.len();
            if got < DEFAULT_POLL_SLOTS || got > max {
                return Err(ComposeError::InvalidPollChoices {
                    got,
                    min: DEFAULT_POLL_SLOTS,
                    max,
                });
            }
        }
    }

    debug!(attachment = request.attachment.kind(), "post request accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("a/b/CAT.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("clip.Mov")), Some("video/quicktime"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }
}
