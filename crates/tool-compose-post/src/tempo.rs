use std::time::Duration;

use tracing::debug;

use crate::errors::SessionError;
use crate::ports::{ElementHandle, SessionPort};

/// One typed chunk followed by a pause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingStep {
    pub chunk: String,
    pub delay: Duration,
}

/// Per-character plan with a fixed delay between keystrokes.
pub fn typing_plan(text: &str, per_char_delay: Duration) -> Vec<TypingStep> {
    text.chars()
        .map(|ch| TypingStep {
            chunk: ch.to_string(),
            delay: per_char_delay,
        })
        .collect()
}

pub async fn type_paced(
    session: &dyn SessionPort,
    element: &ElementHandle,
    text: &str,
    per_char_delay: Duration,
) -> Result<(), SessionError> {
    let plan = typing_plan(text, per_char_delay);
    debug!(chars = plan.len(), "typing into {}", element.locator);
    for step in &plan {
        session.type_text(element, &step.chunk).await?;
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
    }
    Ok(())
}
