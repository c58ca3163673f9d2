//! Runs the session adapter against a real Chromium.
//!
//! Ignored by default; run with `SOULPOST_CDP_CONTRACT=1 cargo test -- --ignored`.

use std::time::Duration;

use cdp_session::{launch, CdpConfig};
use soulpost_locator_registry::Locator;
use tool_compose_post::{SessionError, SessionPort};

const PAGE: &str = "data:text/html,<html><body>\
<button id='go' disabled>go</button>\
<div id='box' contenteditable='true'></div>\
<select id='days'><option value='0'>0</option><option value='1'>1</option></select>\
<input type='file' id='upload'>\
</body></html>";

fn enabled() -> bool {
    std::env::var("SOULPOST_CDP_CONTRACT")
        .map(|v| v == "1")
        .unwrap_or(false)
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn session_port_contract() {
    if !enabled() {
        eprintln!("SOULPOST_CDP_CONTRACT not set; skipping");
        return;
    }

    let cfg = CdpConfig::default().with_env_overrides();
    let (session, handle) = launch(&cfg, "about:blank").await.unwrap();

    session.navigate(PAGE, Duration::from_secs(15)).await.unwrap();
    assert!(session.current_url().await.unwrap().starts_with("data:"));

    assert!(session
        .query(&Locator::css("#missing"))
        .await
        .unwrap()
        .is_empty());

    let button = session.query(&Locator::xpath("//button[@id='go']")).await.unwrap();
    assert_eq!(button.len(), 1);
    assert!(!session.is_enabled(&button[0]).await.unwrap());

    let editor = session.query(&Locator::css("#box")).await.unwrap();
    session.click(&editor[0]).await.unwrap();
    session.type_text(&editor[0], "h").await.unwrap();
    session.type_text(&editor[0], "i").await.unwrap();

    let days = session.query(&Locator::css("#days")).await.unwrap();
    session.select_value(&days[0], "1").await.unwrap();
    let err = session.select_value(&days[0], "9").await.unwrap_err();
    assert!(matches!(err, SessionError::OptionNotFound { .. }));

    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("pixel.png");
    std::fs::write(&media, b"\x89PNG\r\n\x1a\n").unwrap();
    let upload = session.query(&Locator::css("#upload")).await.unwrap();
    session.upload(&upload[0], &media).await.unwrap();

    let shot = dir.path().join("shot.png");
    session.screenshot(&shot).await.unwrap();
    assert!(std::fs::metadata(&shot).unwrap().len() > 0);

    handle.close().await.unwrap();
}
