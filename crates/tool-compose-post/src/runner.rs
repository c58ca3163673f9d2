use std::time::Duration;

use soulpost_locator_registry::{
    DurationField, Locator, LocatorName, LocatorRegistry, DEFAULT_POLL_SLOTS,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::{ComposeFailure, ErrorKind, SessionError};
use crate::location::{redact_url, same_surface};
use crate::model::{
    Attachment, InteractionResult, MediaAttachment, PollSpec, PostRequest, StepRecord,
};
use crate::policy::ComposePolicy;
use crate::ports::{ElementHandle, SessionPort};
use crate::state::{ComposeState, ComposeStep};
use crate::tempo::type_paced;
use crate::wait::{await_element, Readiness, WaitError};

pub struct RuntimeDeps<'a> {
    pub session: &'a dyn SessionPort,
    pub registry: &'a LocatorRegistry,
    pub policy: &'a ComposePolicy,
}

/// Drive one validated request through the composition protocol.
///
/// Never returns an error: mid-protocol failures end in `ComposeState::Failed`
/// and are reported through the result.
#[instrument(
    skip_all,
    fields(
        post_id = %post_id,
        attachment = request.attachment.kind(),
        chars = request.text.chars().count()
    )
)]
pub async fn execute(
    post_id: Uuid,
    request: &PostRequest,
    deps: RuntimeDeps<'_>,
) -> InteractionResult {
    let started = Instant::now();
    let mut run = Run {
        deps: &deps,
        result: InteractionResult::new(post_id),
    };

    match run.drive(request).await {
        Ok(()) => {
            run.result.ok = true;
            info!(confirmed = ?run.result.confirmed, "post submitted");
        }
        Err(failure) => {
            warn!(
                kind = %failure.kind,
                step = %failure.step,
                element = failure.element.as_deref().unwrap_or("-"),
                "post composition failed: {}",
                failure.message
            );
            run.advance(ComposeState::Failed(failure.kind));
            run.result.failure = Some(failure);
        }
    }

    run.snapshot().await;
    run.result.finish(started.elapsed())
}

struct Run<'a, 'd> {
    deps: &'a RuntimeDeps<'d>,
    result: InteractionResult,
}

impl Run<'_, '_> {
    async fn drive(&mut self, request: &PostRequest) -> Result<(), ComposeFailure> {
        self.navigate_if_needed().await?;

        let t = Instant::now();
        let trigger = self
            .await_named(
                ComposeStep::AwaitComposeReady,
                LocatorName::ComposeTrigger,
                Readiness::Present,
            )
            .await?;
        self.record(ComposeStep::AwaitComposeReady, t, false);

        let t = Instant::now();
        self.click(
            ComposeStep::OpenComposer,
            LocatorName::ComposeTrigger.as_str(),
            &trigger,
        )
        .await?;
        self.advance(ComposeState::Composing);
        self.record(ComposeStep::OpenComposer, t, false);

        let t = Instant::now();
        let text_input = LocatorName::TextInput;
        let input = self
            .await_named(ComposeStep::InjectText, text_input, Readiness::Present)
            .await?;
        self.type_into(
            ComposeStep::InjectText,
            text_input.as_str(),
            &input,
            &request.text,
        )
        .await?;
        self.record(ComposeStep::InjectText, t, false);

        let settle = request
            .attachment_settle
            .unwrap_or_else(|| self.deps.policy.timings.attachment_settle());
        match &request.attachment {
            Attachment::None => self.advance(ComposeState::NoAttachment),
            Attachment::Media(media) => {
                let t = Instant::now();
                self.attach_media(media, settle).await?;
                self.advance(ComposeState::MediaAttached);
                self.record(ComposeStep::AttachMedia, t, false);
            }
            Attachment::Poll(poll) => {
                let t = Instant::now();
                self.configure_poll(poll, settle).await?;
                self.advance(ComposeState::PollConfigured);
                self.record(ComposeStep::ConfigurePoll, t, false);
            }
        }

        let t = Instant::now();
        let submit = self
            .await_named(
                ComposeStep::AwaitSubmitEnabled,
                LocatorName::SubmitControl,
                Readiness::Enabled,
            )
            .await?;
        self.advance(ComposeState::ReadyToSubmit);
        self.record(ComposeStep::AwaitSubmitEnabled, t, false);

        let t = Instant::now();
        self.submit_twice(&submit).await?;
        self.advance(ComposeState::Submitted);
        self.record(ComposeStep::Submit, t, false);

        self.confirm().await;
        Ok(())
    }

    async fn navigate_if_needed(&mut self) -> Result<(), ComposeFailure> {
        let t = Instant::now();
        let session = self.deps.session;
        let target = self.deps.policy.compose_url.as_str();
        let current = session
            .current_url()
            .await
            .map_err(|err| session_failure(ComposeStep::Navigate, None, err))?;

        let skipped = same_surface(&current, target);
        if skipped {
            debug!(url = %redact_url(&current), "already on compose surface");
        } else {
            info!(
                from = %redact_url(&current),
                to = %redact_url(target),
                "navigating to compose surface"
            );
            session
                .navigate(target, self.deps.policy.timings.navigation_timeout())
                .await
                .map_err(|err| session_failure(ComposeStep::Navigate, None, err))?;
        }

        self.advance(ComposeState::Navigated);
        self.record(ComposeStep::Navigate, t, skipped);
        Ok(())
    }

    async fn attach_media(
        &mut self,
        media: &MediaAttachment,
        settle: Duration,
    ) -> Result<(), ComposeFailure> {
        let step = ComposeStep::AttachMedia;
        let name = LocatorName::FileInput;
        let input = self
            .await_named(step, name, Readiness::Present)
            .await
            .map_err(|mut failure| {
                if failure.kind == ErrorKind::ElementNotFound {
                    failure.kind = ErrorKind::AttachmentInputMissing;
                }
                failure
            })?;

        debug!(
            path = %media.path.display(),
            mime = media.mime_hint.as_deref().unwrap_or("-"),
            "uploading media"
        );
        self.deps
            .session
            .upload(&input, &media.path)
            .await
            .map_err(|err| session_failure(step, Some(name.as_str()), err))?;
        pause(settle).await;
        Ok(())
    }

    async fn configure_poll(
        &mut self,
        poll: &PollSpec,
        settle: Duration,
    ) -> Result<(), ComposeFailure> {
        let step = ComposeStep::ConfigurePoll;
        let registry = self.deps.registry;

        let trigger = self
            .await_named(step, LocatorName::PollTrigger, Readiness::Present)
            .await?;
        self.click(step, LocatorName::PollTrigger.as_str(), &trigger).await?;

        for (index, choice) in poll.choices.iter().enumerate() {
            if let Some(add) = registry.poll_add_choice_for(index) {
                let label = format!("poll_add_choice[{}]", index - DEFAULT_POLL_SLOTS);
                let control = self.await_locator(step, &label, add, Readiness::Present).await?;
                self.click(step, &label, &control).await?;
            }

            let label = format!("poll_option_inputs[{index}]");
            let locator = registry.poll_option(index).ok_or_else(|| ComposeFailure {
                kind: ErrorKind::ElementNotFound,
                step,
                element: Some(label.clone()),
                message: "no locator configured for this poll slot".to_string(),
            })?;
            let option = self
                .await_locator(step, &label, locator, Readiness::Present)
                .await?;
            self.click(step, &label, &option).await?;
            self.type_into(step, &label, &option, choice).await?;
        }

        for field in DurationField::ALL {
            let value = match field {
                DurationField::Days => poll.duration.days,
                DurationField::Hours => poll.duration.hours,
                DurationField::Minutes => poll.duration.minutes,
            };
            let label = format!("poll_duration.{}", field.as_str());
            let locator = registry.poll_duration(field);
            let selector = self
                .await_locator(step, &label, locator, Readiness::Present)
                .await?;
            self.deps
                .session
                .select_value(&selector, &value.to_string())
                .await
                .map_err(|err| session_failure(step, Some(&label), err))?;
        }

        pause(settle).await;
        Ok(())
    }

    /// Activate submit, then activate it again as best effort once the UI has had time to react.
    async fn submit_twice(&mut self, submit: &ElementHandle) -> Result<(), ComposeFailure> {
        let step = ComposeStep::Submit;
        let name = LocatorName::SubmitControl;
        self.click(step, name.as_str(), submit).await?;
        pause(self.deps.policy.timings.submit_gap()).await;

        let session = self.deps.session;
        match session.query(self.deps.registry.named(name)).await {
            Ok(found) => match found.first() {
                Some(again) => {
                    if let Err(err) = session.click(again).await {
                        debug!(error = %err, "second submit activation failed");
                    }
                }
                None => debug!("submit control gone before second activation"),
            },
            Err(err) => debug!(error = %err, "second submit lookup failed"),
        }

        pause(self.deps.policy.timings.final_settle()).await;
        Ok(())
    }

    async fn confirm(&mut self) {
        let Some(locator) = self.deps.registry.submit_confirmation() else {
            return;
        };
        let t = Instant::now();
        let timings = &self.deps.policy.timings;
        let outcome = await_element(
            self.deps.session,
            locator,
            Readiness::Present,
            timings.confirmation_timeout(),
            timings,
        )
        .await;
        match outcome {
            Ok(_) => self.result.confirmed = Some(true),
            Err(err) => {
                warn!(error = %err, "submission was not confirmed");
                self.result.confirmed = Some(false);
            }
        }
        self.record(ComposeStep::Confirm, t, false);
    }

    async fn snapshot(&self) {
        let Some(path) = self.deps.policy.snapshot_path.as_deref() else {
            return;
        };
        match self.deps.session.screenshot(path).await {
            Ok(()) => debug!(path = %path.display(), "snapshot captured"),
            Err(err) => warn!(path = %path.display(), error = %err, "snapshot capture failed"),
        }
    }

    async fn await_named(
        &self,
        step: ComposeStep,
        name: LocatorName,
        readiness: Readiness,
    ) -> Result<ElementHandle, ComposeFailure> {
        let locator = self.deps.registry.named(name);
        self.await_locator(step, name.as_str(), locator, readiness).await
    }

    async fn await_locator(
        &self,
        step: ComposeStep,
        label: &str,
        locator: &Locator,
        readiness: Readiness,
    ) -> Result<ElementHandle, ComposeFailure> {
        let timings = &self.deps.policy.timings;
        await_element(
            self.deps.session,
            locator,
            readiness,
            timings.readiness_timeout(),
            timings,
        )
        .await
        .map_err(|err| wait_failure(step, label, err))
    }

    async fn click(
        &self,
        step: ComposeStep,
        label: &str,
        element: &ElementHandle,
    ) -> Result<(), ComposeFailure> {
        self.deps
            .session
            .click(element)
            .await
            .map_err(|err| session_failure(step, Some(label), err))
    }

    async fn type_into(
        &self,
        step: ComposeStep,
        label: &str,
        element: &ElementHandle,
        text: &str,
    ) -> Result<(), ComposeFailure> {
        type_paced(
            self.deps.session,
            element,
            text,
            self.deps.policy.timings.per_char_delay(),
        )
        .await
        .map_err(|err| session_failure(step, Some(label), err))
    }

    fn advance(&mut self, next: ComposeState) {
        let current = self.result.state;
        if !current.can_advance_to(&next) {
            warn!(from = %current, to = %next, "unexpected compose state transition");
        }
        info!(from = %current, to = %next, "compose state");
        self.result.state = next;
    }

    fn record(&mut self, step: ComposeStep, started: Instant, skipped: bool) {
        self.result.steps.push(StepRecord {
            step,
            latency_ms: started.elapsed().as_millis() as u64,
            skipped,
        });
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

fn wait_failure(step: ComposeStep, label: &str, err: WaitError) -> ComposeFailure {
    let message = err.to_string();
    let kind = match err {
        WaitError::NeverPresent { .. } if step == ComposeStep::AwaitSubmitEnabled => {
            ErrorKind::SubmitControlMissing
        }
        WaitError::NeverPresent { .. } => ErrorKind::ElementNotFound,
        WaitError::NeverEnabled { .. } => ErrorKind::ReadinessTimeout,
        WaitError::Session(err) => return session_failure(step, Some(label), err),
    };
    ComposeFailure {
        kind,
        step,
        element: Some(label.to_string()),
        message,
    }
}

fn session_failure(step: ComposeStep, label: Option<&str>, err: SessionError) -> ComposeFailure {
    let kind = match &err {
        SessionError::NotFound(_) | SessionError::OptionNotFound { .. } => {
            ErrorKind::ElementNotFound
        }
        SessionError::Timeout(_) => ErrorKind::ReadinessTimeout,
        SessionError::Io(_) | SessionError::Unsupported(_) => ErrorKind::SessionIo,
    };
    ComposeFailure {
        kind,
        step,
        element: label.map(str::to_string),
        message: err.to_string(),
    }
}
