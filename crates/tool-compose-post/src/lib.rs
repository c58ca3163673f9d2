//! Post composition over a remote, asynchronously rendered UI
//!
//! The engine drives one session through navigate, compose, attach and submit,
//! guarding every element access with a bounded readiness wait.

pub mod api;
pub mod errors;
pub mod model;
pub mod policy;
pub mod ports;
pub mod state;

mod location;
mod precheck;
mod runner;
mod tempo;
mod wait;

pub use api::ComposeEngine;
pub use errors::{ComposeError, ComposeFailure, ErrorKind, SessionError};
pub use location::same_surface;
pub use model::{
    Attachment, InteractionResult, MediaAttachment, PollDuration, PollSpec, PostDraft,
    PostRequest, StepRecord,
};
pub use policy::{ComposePolicy, ComposeTimings, DEFAULT_COMPOSE_URL};
pub use ports::{ElementHandle, FsMediaProbe, MediaProbe, SessionPort};
pub use precheck::{mime_for_path, validate_request};
pub use state::{ComposeState, ComposeStep};
