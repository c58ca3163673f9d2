use std::sync::Arc;

use soulpost_locator_registry::LocatorRegistry;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ComposeError;
use crate::model::{InteractionResult, PostDraft, PostRequest};
use crate::policy::ComposePolicy;
use crate::ports::{FsMediaProbe, MediaProbe, SessionPort};
use crate::precheck::validate_request;
use crate::runner::{execute, RuntimeDeps};

/// Composition engine bound to one browser session.
///
/// `submit` borrows the engine mutably, so submissions on one session are
/// serialized by construction.
pub struct ComposeEngine {
    registry: Arc<LocatorRegistry>,
    session: Box<dyn SessionPort>,
    probe: Arc<dyn MediaProbe>,
    policy: ComposePolicy,
}

impl ComposeEngine {
    pub fn new(registry: Arc<LocatorRegistry>, session: Box<dyn SessionPort>) -> Self {
        Self {
            registry,
            session,
            probe: Arc::new(FsMediaProbe),
            policy: ComposePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ComposePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn policy(&self) -> &ComposePolicy {
        &self.policy
    }

    pub fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Run the precondition checks only; no session call is made.
    pub async fn validate(&self, request: &PostRequest) -> Result<(), ComposeError> {
        validate_request(request, &self.registry, self.probe.as_ref()).await
    }

    /// Validate `request`, then compose and submit it through the session.
    ///
    /// `Err` is reserved for precondition failures, which never touch the UI.
    /// Anything that goes wrong afterwards is reported in the returned result.
    pub async fn submit(
        &mut self,
        request: PostRequest,
    ) -> Result<InteractionResult, ComposeError> {
        let post_id = Uuid::new_v4();
        if let Err(err) = self.validate(&request).await {
            debug!(%post_id, kind = %err.kind(), "post rejected before interaction");
            return Err(err);
        }

        let deps = RuntimeDeps {
            session: self.session.as_ref(),
            registry: self.registry.as_ref(),
            policy: &self.policy,
        };
        Ok(execute(post_id, &request, deps).await)
    }

    pub async fn submit_draft(
        &mut self,
        draft: PostDraft,
    ) -> Result<InteractionResult, ComposeError> {
        let request = PostRequest::try_from(draft)?;
        self.submit(request).await
    }

    /// Hand the session back, e.g. to close the browser.
    pub fn into_session(self) -> Box<dyn SessionPort> {
        self.session
    }
}
