//! Config file and persisted tutorial flag, as the binaries load them.

use std::fs;
use std::time::Duration;

use vibe_config::{FileTutorialFlag, VibeConfig};
use vibe_core::TutorialPrompt;

#[test]
fn config_file_drives_routes_and_timeouts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[gemini]
model = "gemini-2.5-flash"
timeout_secs = 8

[proxy]
url = "http://10.0.0.2:9000/api/generate"

[server]
bind = "0.0.0.0:9000"
"#,
    )
    .unwrap();

    let config = VibeConfig::load_from(&path).unwrap().unwrap();
    assert_eq!(config.gemini.model, "gemini-2.5-flash");
    assert_eq!(config.gemini.timeout(), Duration::from_secs(8));
    assert_eq!(
        config.proxy.enabled_url().as_deref(),
        Some("http://10.0.0.2:9000/api/generate")
    );
    assert_eq!(config.server.bind, "0.0.0.0:9000");
}

#[test]
fn tutorial_is_shown_until_dismissed_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".vibe").join("state.toml");

    let mut first_run = TutorialPrompt::new(FileTutorialFlag::open(&path));
    assert!(first_run.is_visible());
    let mut second_run = TutorialPrompt::new(FileTutorialFlag::open(&path));
    assert!(second_run.is_visible());

    first_run.dismiss().unwrap();
    assert!(!first_run.is_visible());
    // Read once at start: an already running prompt keeps its state.
    assert!(second_run.is_visible());
    second_run.dismiss().unwrap();

    let third_run = TutorialPrompt::new(FileTutorialFlag::open(&path));
    assert!(!third_run.is_visible());
    let state = fs::read_to_string(&path).unwrap();
    assert_eq!(state.matches("[tutorial]").count(), 1);
}
