// Configuration file handling as seen by the binary
use std::fs;
use std::path::PathBuf;

use chatpane::{ChatApp, Config, ImageBounds, Side, config_manager};

fn scratch_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chatpane-config-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn test_partial_config_keeps_defaults() {
    let path = scratch_file("partial.json");
    fs::write(
        &path,
        r#"{ "left_user": "Dana", "thumbnail": { "max_width": 120, "max_height": 90 } }"#,
    )
    .unwrap();

    let config = config_manager::load_config(&path).unwrap();
    assert_eq!(config.left_user, "Dana");
    assert_eq!(config.right_user, "Bob");
    assert_eq!(config.thumbnail, ImageBounds::new(120, 90));
    assert_eq!(config.preview, ImageBounds::preview());
    assert_eq!(config.wrap_columns, 40);
    assert!(config.seed_sample_data);
}

#[test]
fn test_default_config_is_written_once() {
    let path = scratch_file("nested/config.json");
    let _ = fs::remove_file(&path);

    config_manager::ensure_default_config_at(&path).unwrap();
    let written: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.max_message_length, 10_000);

    // An existing file is left alone
    fs::write(&path, r#"{ "right_user": "Eve" }"#).unwrap();
    config_manager::ensure_default_config_at(&path).unwrap();
    assert_eq!(config_manager::load_config(&path).unwrap().right_user, "Eve");
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let path = scratch_file("broken.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(config_manager::load_config(&path).is_err());
    let config = config_manager::load_config_or_default(&path);
    assert_eq!(config.left_user, "Alice");
}

#[test]
fn test_config_drives_the_application() {
    let config = Config {
        left_user: "Dana".to_string(),
        max_message_length: 3,
        ..Config::default()
    };
    let app = ChatApp::new(config).unwrap();

    let message = app.send(Side::Left, "abcdef").unwrap();
    assert_eq!(message.sender_name, "Dana");
    assert_eq!(message.text.as_deref(), Some("abc"));
}
