use super::{
    config_dir, CaseSensitivity, ColourPair, ConfigError, ConfigStore, FilterMode, LongDent,
    NotifyStyle, AUTH_FILE, CONFIG_FILE,
};
use crate::editor::CompletionMode;
use crate::test_utils::{env_lock, EnvVarGuard};
use crate::ui::Region;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config dir");
    }
    fs::write(path, contents).expect("write config");
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
}

#[test]
fn missing_config_writes_defaults() {
    let root = TempDir::new().expect("temp dir");
    let dir = root.path().join("dentui");
    let store = ConfigStore::load_from(dir.clone()).expect("load");

    assert!(store.was_created());
    assert!(dir.join(CONFIG_FILE).exists());
    assert!(dir.join(AUTH_FILE).exists());
    let config = store.config();
    assert!(config.enable_colours);
    assert_eq!(config.notice_limit, 25);
    assert_eq!(config.update_interval, 60);
    assert_eq!(config.browser, "xdg-open '%s'");
    assert_eq!(config.initial_tabs, "home|mentions|direct|public");
    assert_eq!(config.notify, NotifyStyle::Flash);
    assert_eq!(config.long_dent, LongDent::Split);
    assert_eq!(config.filter_mode, FilterMode::Plain);
    assert_eq!(config.search_case_sensitive, CaseSensitivity::Sensitive);
    assert_eq!(config.tab_complete_mode, CompletionMode::Exact);
    assert!(config.smooth_cscroll);
    assert!(config.show_source);
    assert!(config.enumerate_tabs);
    assert!(!config.border);
    assert_eq!(config.ui_order.len(), 6);
    assert!(config.aliases.is_empty());
    assert_eq!(store.credentials().username, "");
}

#[test]
fn second_load_is_not_created() {
    let root = TempDir::new().expect("temp dir");
    let dir = root.path().join("dentui");
    ConfigStore::load_from(dir.clone()).expect("first load");
    let store = ConfigStore::load_from(dir).expect("second load");
    assert!(!store.was_created());
}

#[test]
fn invalid_choices_fall_back() {
    let root = TempDir::new().expect("temp dir");
    write(
        &root.path().join(CONFIG_FILE),
        r#"{
            "filter_mode": "glob",
            "tab_complete_mode": "sloppy",
            "notify": "shout",
            "long_dent": "squash",
            "search_case_sensitive": "whatever"
        }"#,
    );
    write(&root.path().join(AUTH_FILE), "{}");
    let store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    let config = store.config();
    assert_eq!(config.filter_mode, FilterMode::Plain);
    assert_eq!(config.tab_complete_mode, CompletionMode::Exact);
    assert_eq!(config.notify, NotifyStyle::Off);
    assert_eq!(config.long_dent, LongDent::AsIs);
    assert_eq!(config.search_case_sensitive, CaseSensitivity::Insensitive);
}

#[test]
fn partial_colour_scheme_is_merged() {
    let root = TempDir::new().expect("temp dir");
    write(
        &root.path().join(CONFIG_FILE),
        r#"{"colours": {"username": ["red", "black"], "tag": "yellow"}}"#,
    );
    write(&root.path().join(AUTH_FILE), "{}");
    let store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    let colours = &store.config().colours;
    assert_eq!(
        colours.get("username"),
        Some(&ColourPair {
            fg: "red".to_string(),
            bg: "black".to_string()
        })
    );
    assert_eq!(colours.get("tag").map(|pair| pair.fg.as_str()), Some("yellow"));
    assert_eq!(colours.get("tag").map(|pair| pair.bg.as_str()), Some("none"));
    assert_eq!(
        colours.get("statusbar").map(|pair| pair.fg.as_str()),
        Some("black")
    );
}

#[test]
fn keys_accept_single_names_and_ui_order_is_normalized() {
    let root = TempDir::new().expect("temp dir");
    write(
        &root.path().join(CONFIG_FILE),
        r#"{
            "keys": {"scrolldown": "J", "quit": ["Q", "ctrl+c"]},
            "ui_order": ["tabbar", "notices", "entry"]
        }"#,
    );
    write(&root.path().join(AUTH_FILE), "{}");
    let store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    let config = store.config();
    assert_eq!(config.keys["scrolldown"], vec!["J".to_string()]);
    assert_eq!(config.keys["quit"].len(), 2);
    assert_eq!(
        config.ui_order,
        vec![
            Region::Tabbar,
            Region::Notices,
            Region::Entry,
            Region::Statusbar
        ]
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let root = TempDir::new().expect("temp dir");
    write(&root.path().join(CONFIG_FILE), "{ not json");
    write(&root.path().join(AUTH_FILE), "{}");
    let err = ConfigStore::load_from(root.path().to_path_buf()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(CONFIG_FILE));
}

#[test]
fn wrong_types_are_reported() {
    let root = TempDir::new().expect("temp dir");
    write(&root.path().join(CONFIG_FILE), r#"{"notice_limit": "many"}"#);
    write(&root.path().join(AUTH_FILE), "{}");
    let err = ConfigStore::load_from(root.path().to_path_buf()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn legacy_single_file_moves_into_directory() {
    let root = TempDir::new().expect("temp dir");
    let base = root.path().join("dentui");
    write(
        &base,
        r#"{"username": "alice", "password": "pw", "notice_limit": 40}"#,
    );
    let store = ConfigStore::load_from(base.clone()).expect("load");

    assert!(base.is_dir());
    assert!(!store.was_created());
    assert_eq!(store.config().notice_limit, 40);
    assert_eq!(store.credentials().username, "alice");

    let config = read_json(&base.join(CONFIG_FILE));
    assert!(config.get("username").is_none());
    let auth = read_json(&base.join(AUTH_FILE));
    assert_eq!(auth["password"], "pw");
}

#[test]
fn credentials_split_only_once() {
    let root = TempDir::new().expect("temp dir");
    write(
        &root.path().join(CONFIG_FILE),
        r#"{"username": "bob", "border": true}"#,
    );
    ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    write(&root.path().join(AUTH_FILE), r#"{"username": "carol"}"#);
    write(
        &root.path().join(CONFIG_FILE),
        r#"{"username": "stale", "border": true}"#,
    );
    let store = ConfigStore::load_from(root.path().to_path_buf()).expect("reload");
    assert_eq!(store.credentials().username, "carol");
    assert!(store.config().border);
}

#[test]
fn set_parses_json_values_and_saves() {
    let root = TempDir::new().expect("temp dir");
    let mut store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");

    store.set("notice_limit", "40").expect("set number");
    store.set("border", "true").expect("set bool");
    store.set("browser", "firefox %s").expect("set string");
    store.set("colours.username", r#"["red", "none"]"#).expect("set colour");

    assert_eq!(store.config().notice_limit, 40);
    assert!(store.config().border);
    assert_eq!(store.config().browser, "firefox %s");
    let saved = read_json(&root.path().join(CONFIG_FILE));
    assert_eq!(saved["notice_limit"], 40);
    assert_eq!(saved["colours"]["username"][0], "red");
    // Defaults the user never set stay out of the file.
    assert!(saved.get("show_source").is_none());
}

#[test]
fn set_rejects_unknown_keys_and_bad_values() {
    let root = TempDir::new().expect("temp dir");
    let mut store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");

    let err = store.set("frobnicate", "1").expect_err("unknown key");
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = store.set("notice_limit", "lots").expect_err("bad value");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(store.config().notice_limit, 25);
}

#[test]
fn credentials_are_written_to_auth_file() {
    let root = TempDir::new().expect("temp dir");
    let mut store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    store.set("username", "dave").expect("set username");
    assert_eq!(store.credentials().username, "dave");
    let auth = read_json(&root.path().join(AUTH_FILE));
    assert_eq!(auth["username"], "dave");
    let config = read_json(&root.path().join(CONFIG_FILE));
    assert!(config.get("username").is_none());
}

#[test]
fn aliases_get_leading_slashes() {
    let root = TempDir::new().expect("temp dir");
    let mut store = ConfigStore::load_from(root.path().to_path_buf()).expect("load");
    store.set_alias("fav", "favourite").expect("alias");
    assert_eq!(
        store.config().aliases.get("/fav").map(String::as_str),
        Some("/favourite")
    );
    let saved = read_json(&root.path().join(CONFIG_FILE));
    assert_eq!(saved["aliases"]["/fav"], "/favourite");
}

#[test]
fn home_env_overrides_config_dir() {
    let _guard = env_lock();
    let root = TempDir::new().expect("temp dir");
    let _home = EnvVarGuard::home(root.path());
    assert_eq!(config_dir().expect("dir"), root.path());
}
