//! Chromium DevTools backend for the post composition engine
//!
//! Launches a browser through `chromiumoxide`, installs exported session
//! cookies and exposes the page as a `SessionPort`.

mod browser;
pub mod config;
pub mod cookies;
pub mod errors;
mod session;

pub use browser::{launch, BrowserHandle};
pub use config::{detect_chrome_executable, CdpConfig};
pub use cookies::{load_cookies, StoredCookie};
pub use errors::CdpSessionError;
pub use session::ChromiumSession;
