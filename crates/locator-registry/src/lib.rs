//! Locator registry for scripted UI interaction
//!
//! Maps semantic element names ("compose trigger", "submit control", ...) to
//! declarative locators in the remote document:
//! - single named locators for the fixed controls
//! - ordered families for the indexed poll controls
//! - loaded once from YAML/JSON and read-only afterwards

pub mod errors;
mod locator;
mod registry;

pub use errors::LocatorError;
pub use locator::Locator;
pub use registry::{
    DurationField, LocatorName, LocatorRegistry, PollDurationLocators, DEFAULT_POLL_SLOTS,
};
