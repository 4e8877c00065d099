use std::{fs, path::Path};

use mcp360_config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader, DeckConfigSource,
    models::{DECK_CONFIG_JSON_ENV, DECK_CONFIG_PATH_ENV},
};
use mcp360_core::{EasingFunction, SlateDeck, SlateIndex};
use once_cell::sync::Lazy;
use tempfile::tempdir;
use tokio::sync::Mutex;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn clear_deck_overrides() {
    for key in [DECK_CONFIG_PATH_ENV, DECK_CONFIG_JSON_ENV] {
        unsafe { std::env::remove_var(key) };
    }
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write config fixture");
}

const TWO_SLATE_TOML: &str = r#"
viewport_height = 720.0

[scroll]
duration_ms = 450
easing = "ease-out-cubic"

[[slates]]
label = "Intro"

[[slates]]
id = "chat-playground"
label = "Chat"
schedule = [
  { step = 1, delay_ms = 500 },
  { step = 2, delay_ms = 1500 },
]
"#;

#[tokio::test]
async fn explicit_toml_path_builds_a_layout() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deck.toml");
    write(&path, TWO_SLATE_TOML);

    let load = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_config_path(&path)
        .load()
        .expect("load");

    assert_eq!(load.source, DeckConfigSource::File(path));
    assert!(load.warnings.is_empty());
    assert_eq!(load.config.scroll.easing, EasingFunction::EaseOutCubic);
    assert_eq!(load.layout.viewport_height, 720.0);
    assert_eq!(load.layout.slates.len(), 2);
    assert_eq!(load.layout.slates[1].schedule.final_step(), 2);

    let deck = SlateDeck::new(load.layout).expect("deck");
    let labels: Vec<_> =
        deck.navigation().into_iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["Intro", "Chat"]);
}

#[tokio::test]
async fn env_path_takes_precedence_over_inline_json() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("override.json");
    write(
        &path,
        r#"{"viewport_height": 800.0, "slates": [{"label": "From file"}]}"#,
    );
    unsafe {
        std::env::set_var(DECK_CONFIG_PATH_ENV, &path);
        std::env::set_var(
            DECK_CONFIG_JSON_ENV,
            r#"{"slates": [{"label": "Inline"}]}"#,
        );
    }

    let load = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .load()
        .expect("load");
    clear_deck_overrides();

    assert_eq!(load.source, DeckConfigSource::EnvPath(path));
    assert_eq!(load.layout.slates[0].label, "From file");
}

#[tokio::test]
async fn inline_json_is_used_when_no_path_is_set() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    unsafe {
        std::env::set_var(
            DECK_CONFIG_JSON_ENV,
            r#"{"slates": [{"label": "A"}, {"label": "B"}, {"label": "C"}]}"#,
        );
    }

    let load = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .load()
        .expect("load");
    clear_deck_overrides();

    assert_eq!(load.source, DeckConfigSource::EnvInline);
    assert_eq!(load.layout.slates.len(), 3);
}

#[tokio::test]
async fn env_file_can_point_at_the_config() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("deck.toml");
    write(&config_path, TWO_SLATE_TOML);
    write(
        &dir.path().join(".env"),
        &format!("{DECK_CONFIG_PATH_ENV}={}\n", config_path.display()),
    );

    let load = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .load()
        .expect("load");
    clear_deck_overrides();

    assert_eq!(load.source, DeckConfigSource::EnvPath(config_path));
    assert_eq!(load.layout.slates.len(), 2);
}

#[tokio::test]
async fn falls_back_to_the_built_in_deck() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let load = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .load()
        .expect("load");

    // Running from the crate directory, none of the default candidates exist.
    assert_eq!(load.source, DeckConfigSource::Default);
    let deck = SlateDeck::new(load.layout).expect("deck");
    assert_eq!(deck.len(), 8);
    assert_eq!(
        deck.sequencer(SlateIndex::new(6))
            .map(|seq| seq.schedule().len()),
        Some(9)
    );
}

#[tokio::test]
async fn missing_explicit_path_is_an_error() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let err = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_config_path(dir.path().join("nope.toml"))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[tokio::test]
async fn guard_rail_failures_surface() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deck.toml");
    write(
        &path,
        r#"
[[slates]]
label = "Backwards"
schedule = [
  { step = 2, delay_ms = 100 },
  { step = 1, delay_ms = 200 },
]
"#,
    );

    let err = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_config_path(&path)
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::InvalidSchedule {
            slate: 0,
            ..
        })
    ));
}

#[tokio::test]
async fn malformed_file_reports_its_path() {
    let _guard = ENV_LOCK.lock().await;
    clear_deck_overrides();

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deck.toml");
    write(&path, "viewport_height = \"tall\"");

    let err = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_config_path(&path)
        .load()
        .unwrap_err();
    match err {
        ConfigLoadError::Deck(inner) => {
            assert!(inner.to_string().contains("deck.toml"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
