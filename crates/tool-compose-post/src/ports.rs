use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use soulpost_locator_registry::Locator;

use crate::errors::SessionError;

/// One element resolved by a `query`, addressed by its position in the match list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementHandle {
    pub locator: Locator,
    pub index: usize,
}

impl ElementHandle {
    pub fn new(locator: Locator, index: usize) -> Self {
        Self { locator, index }
    }
}

/// Capabilities the engine needs from a live browser page.
#[async_trait]
pub trait SessionPort: Send + Sync {
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Load `url` and return once the document is complete and the network has gone quiet.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    /// Resolve every element matching `locator`; an empty list means not present yet.
    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, SessionError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), SessionError>;

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), SessionError>;

    async fn upload(&self, element: &ElementHandle, path: &Path) -> Result<(), SessionError>;

    async fn select_value(&self, element: &ElementHandle, value: &str)
        -> Result<(), SessionError>;

    async fn screenshot(&self, path: &Path) -> Result<(), SessionError>;
}

/// File-system existence check for media attachments.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;
}

/// `MediaProbe` backed by `tokio::fs`.
#[derive(Clone, Debug, Default)]
pub struct FsMediaProbe;

#[async_trait]
impl MediaProbe for FsMediaProbe {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
