//! Configuration loading, migration and editing.
//!
//! Config lives in a directory (default `~/.config/dentui`, overridable
//! with `DENTUI_HOME`) holding two JSON files:
//! 1. `config.json`: display, behaviour, keys and aliases
//! 2. `auth.json`: credentials, split out so config can be shared
//!
//! The JSON documents are kept as loaded so `/config` edits and saves
//! only what the user set; the typed `Config` is derived from them with
//! defaults filled in. Choice-valued options that hold an unknown value
//! fall back instead of failing the whole load.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::editor::CompletionMode;
use crate::ui::{default_order, normalize_order, Region};

pub const HOME_ENV: &str = "DENTUI_HOME";
pub const CONFIG_FILE: &str = "config.json";
pub const AUTH_FILE: &str = "auth.json";

/// Keys that belong in `auth.json`.
const AUTH_FIELDS: &[&str] = &[
    "username",
    "password",
    "oauth_token",
    "oauth_token_secret",
    "consumer_key",
    "consumer_secret",
];

/// Keys `/config` may set.
const OPTION_KEYS: &[&str] = &[
    "api_path",
    "enable_colours",
    "colours",
    "search_case_sensitive",
    "notify",
    "long_dent",
    "filters",
    "filter_mode",
    "notice_limit",
    "browser",
    "border",
    "compact_notices",
    "user_rainbow",
    "group_rainbow",
    "tag_rainbow",
    "smooth_cscroll",
    "use_oauth",
    "show_notice_links",
    "length_override",
    "show_source",
    "tab_complete_mode",
    "new_reply_mode",
    "enumerate_tabs",
    "keys",
    "aliases",
    "ui_order",
    "update_interval",
    "initial_tabs",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("{0} is not supported")]
    Unsupported(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
        default $default:ident, otherwise $fallback:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
        #[serde(from = "String")]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.trim().to_lowercase().as_str() {
                    $($text => $name::$variant,)+
                    other => {
                        warn!(value = %other, option = stringify!($name), "unrecognised config value");
                        $name::$fallback
                    }
                }
            }
        }
    };
}

choice! {
    CaseSensitivity { Sensitive => "sensitive", Insensitive => "insensitive" }
    default Sensitive, otherwise Insensitive
}

choice! {
    /// What happens when a refresh brings new mentions or directs.
    NotifyStyle { Flash => "flash", Beep => "beep", Off => "none" }
    default Flash, otherwise Off
}

choice! {
    /// Handling of notices longer than the server limit.
    LongDent { Split => "split", Truncate => "truncate", AsIs => "none" }
    default Split, otherwise AsIs
}

choice! {
    FilterMode { Plain => "plain", Regex => "regex" }
    default Plain, otherwise Plain
}

/// Foreground and background colour names for one display field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawColour")]
pub struct ColourPair {
    pub fg: String,
    pub bg: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColour {
    Pair(String, String),
    Words(String),
}

impl From<RawColour> for ColourPair {
    fn from(raw: RawColour) -> Self {
        match raw {
            RawColour::Pair(fg, bg) => ColourPair { fg, bg },
            RawColour::Words(words) => {
                let mut parts = words.split_whitespace();
                let fg = parts.next().unwrap_or("none").to_string();
                let bg = parts.next().unwrap_or("none").to_string();
                ColourPair { fg, bg }
            }
        }
    }
}

impl ColourPair {
    pub fn new(fg: &str, bg: &str) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
        }
    }
}

pub fn default_colours() -> BTreeMap<String, ColourPair> {
    [
        ("none", "none", "none"),
        ("statusbar", "black", "white"),
        ("timelines", "none", "none"),
        ("selector", "brown", "none"),
        ("username", "cyan", "none"),
        ("time", "brown", "none"),
        ("source", "green", "none"),
        ("notice_count", "blue", "none"),
        ("notice", "none", "none"),
        ("profile_title", "cyan", "none"),
        ("profile_fields", "blue", "none"),
        ("profile_values", "none", "none"),
        ("group", "cyan", "none"),
        ("tag", "cyan", "none"),
        ("search_highlight", "white", "blue"),
        ("tabbar", "white", "blue"),
        ("tabbar_active", "blue", "white"),
        ("notice_link", "green", "none"),
        ("warning", "black", "red"),
        ("pause_line", "white", "red"),
    ]
    .into_iter()
    .map(|(field, fg, bg)| (field.to_string(), ColourPair::new(fg, bg)))
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_notice_limit() -> u32 {
    25
}

fn default_browser() -> String {
    "xdg-open '%s'".to_string()
}

fn default_update_interval() -> u64 {
    60
}

fn default_initial_tabs() -> String {
    "home|mentions|direct|public".to_string()
}

fn merge_colours<'de, D>(deserializer: D) -> Result<BTreeMap<String, ColourPair>, D::Error>
where
    D: Deserializer<'de>,
{
    let user = BTreeMap::<String, ColourPair>::deserialize(deserializer)?;
    let mut colours = default_colours();
    colours.extend(user);
    Ok(colours)
}

fn lenient_completion<'de, D>(deserializer: D) -> Result<CompletionMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(CompletionMode::from_config(value.trim()))
}

fn region_order<'de, D>(deserializer: D) -> Result<Vec<Region>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_order(&names))
}

/// Accept `"j"` as well as `["j", "down"]` for a key binding.
fn key_lists<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(action, keys)| {
            let keys = match keys {
                OneOrMany::One(key) => vec![key],
                OneOrMany::Many(keys) => keys,
            };
            (action, keys)
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_path: String,
    pub enable_colours: bool,
    #[serde(deserialize_with = "merge_colours")]
    pub colours: BTreeMap<String, ColourPair>,
    pub search_case_sensitive: CaseSensitivity,
    pub notify: NotifyStyle,
    pub long_dent: LongDent,
    pub filters: Vec<String>,
    pub filter_mode: FilterMode,
    pub notice_limit: u32,
    pub browser: String,
    pub border: bool,
    pub compact_notices: bool,
    pub user_rainbow: bool,
    pub group_rainbow: bool,
    pub tag_rainbow: bool,
    pub smooth_cscroll: bool,
    pub use_oauth: bool,
    pub show_notice_links: bool,
    pub length_override: usize,
    pub show_source: bool,
    #[serde(deserialize_with = "lenient_completion")]
    pub tab_complete_mode: CompletionMode,
    pub new_reply_mode: bool,
    pub enumerate_tabs: bool,
    #[serde(deserialize_with = "key_lists")]
    pub keys: BTreeMap<String, Vec<String>>,
    pub aliases: BTreeMap<String, String>,
    #[serde(deserialize_with = "region_order")]
    pub ui_order: Vec<Region>,
    pub update_interval: u64,
    pub initial_tabs: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_path: String::new(),
            enable_colours: default_true(),
            colours: default_colours(),
            search_case_sensitive: CaseSensitivity::default(),
            notify: NotifyStyle::default(),
            long_dent: LongDent::default(),
            filters: Vec::new(),
            filter_mode: FilterMode::default(),
            notice_limit: default_notice_limit(),
            browser: default_browser(),
            border: false,
            compact_notices: false,
            user_rainbow: false,
            group_rainbow: false,
            tag_rainbow: false,
            smooth_cscroll: default_true(),
            use_oauth: false,
            show_notice_links: false,
            length_override: 0,
            show_source: default_true(),
            tab_complete_mode: CompletionMode::default(),
            new_reply_mode: false,
            enumerate_tabs: default_true(),
            keys: BTreeMap::new(),
            aliases: BTreeMap::new(),
            ui_order: default_order(),
            update_interval: default_update_interval(),
            initial_tabs: default_initial_tabs(),
        }
    }
}

impl Config {
    /// Normalise aliases so both sides carry their leading `/`.
    fn normalize(mut self) -> Self {
        self.aliases = self
            .aliases
            .into_iter()
            .map(|(alias, command)| (slashed(&alias), slashed(&command)))
            .collect();
        if self.update_interval == 0 {
            warn!("update_interval of 0 is not allowed, using the default");
            self.update_interval = default_update_interval();
        }
        self
    }

    pub fn case_sensitive_search(&self) -> bool {
        self.search_case_sensitive == CaseSensitivity::Sensitive
    }
}

fn slashed(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolve the configuration directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("dentui"))
        .ok_or_else(|| ConfigError::Invalid("cannot determine the home directory".to_string()))
}

/// The loaded documents plus their typed view.
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    document: Map<String, Value>,
    auth: Map<String, Value>,
    config: Config,
    credentials: Credentials,
    created: bool,
}

impl ConfigStore {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_dir()?)
    }

    pub fn load_from(dir: PathBuf) -> Result<Self, ConfigError> {
        migrate_legacy_file(&dir)?;
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        split_credentials(&dir)?;

        let config_path = dir.join(CONFIG_FILE);
        let created = !config_path.exists();
        if created {
            write_default_documents(&dir)?;
        }

        let document = read_document(&config_path)?;
        let auth_path = dir.join(AUTH_FILE);
        let auth = if auth_path.exists() {
            read_document(&auth_path)?
        } else {
            Map::new()
        };
        let config = derive_config(&document, &config_path)?;
        let credentials = derive_credentials(&document, &auth, &auth_path)?;

        Ok(Self {
            dir,
            document,
            auth,
            config,
            credentials,
            created,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// True when this load wrote a fresh default config.
    pub fn was_created(&self) -> bool {
        self.created
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join("dentui.log")
    }

    /// Set `key` (or `key.subkey`) to `value` and save. The value is read
    /// as JSON when it parses, otherwise as a plain string. Nothing is
    /// changed if the result does not load.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut parts = key.splitn(2, '.');
        let top = parts.next().unwrap_or_default().trim();
        let sub = parts.next().map(str::trim);
        let is_auth = AUTH_FIELDS.contains(&top);
        if !is_auth && !OPTION_KEYS.contains(&top) {
            return Err(ConfigError::Invalid(format!("unknown option '{top}'")));
        }
        let parsed = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));

        let mut document = if is_auth {
            self.auth.clone()
        } else {
            self.document.clone()
        };
        match sub {
            Some(sub) if !sub.is_empty() => {
                let entry = document
                    .entry(top.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                let Value::Object(map) = entry else {
                    return Err(ConfigError::Invalid(format!("'{top}' is not a table")));
                };
                map.insert(sub.to_string(), parsed);
            }
            _ => {
                document.insert(top.to_string(), parsed);
            }
        }

        if is_auth {
            let auth_path = self.dir.join(AUTH_FILE);
            self.credentials = derive_credentials(&self.document, &document, &auth_path)?;
            self.auth = document;
        } else {
            let config_path = self.dir.join(CONFIG_FILE);
            self.config = derive_config(&document, &config_path)?;
            self.document = document;
        }
        info!(key, "config option changed");
        self.save()
    }

    pub fn set_alias(&mut self, alias: &str, expansion: &str) -> Result<(), ConfigError> {
        let mut document = self.document.clone();
        let entry = document
            .entry("aliases".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(aliases) = entry else {
            return Err(ConfigError::Invalid("'aliases' is not a table".to_string()));
        };
        aliases.insert(slashed(alias), Value::String(slashed(expansion)));
        self.config = derive_config(&document, &self.dir.join(CONFIG_FILE))?;
        self.document = document;
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        write_document(&self.dir.join(CONFIG_FILE), &self.document)?;
        if !self.auth.is_empty() {
            write_document(&self.dir.join(AUTH_FILE), &self.auth)?;
        }
        Ok(())
    }
}

fn derive_config(document: &Map<String, Value>, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_value(Value::Object(document.clone())).map_err(
        |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
    )?;
    Ok(config.normalize())
}

/// Credentials from `auth.json`, falling back to any left in `config.json`.
fn derive_credentials(
    document: &Map<String, Value>,
    auth: &Map<String, Value>,
    path: &Path,
) -> Result<Credentials, ConfigError> {
    let mut merged: Map<String, Value> = document
        .iter()
        .filter(|(key, _)| AUTH_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    merged.extend(auth.clone());
    serde_json::from_value(Value::Object(merged)).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_document(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(io_error(path))?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::Invalid(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
        Err(source) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_document(path: &Path, document: &Map<String, Value>) -> Result<(), ConfigError> {
    let contents = serde_json::to_string_pretty(document).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents + "\n").map_err(io_error(path))
}

/// Older releases kept everything in a single file at the directory's
/// path. Move it inside as `config.json`.
fn migrate_legacy_file(dir: &Path) -> Result<(), ConfigError> {
    if !dir.is_file() {
        return Ok(());
    }
    let contents = fs::read_to_string(dir).map_err(io_error(dir))?;
    fs::remove_file(dir).map_err(io_error(dir))?;
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let target = dir.join(CONFIG_FILE);
    fs::write(&target, contents).map_err(io_error(&target))?;
    info!(path = %target.display(), "moved legacy config file into config directory");
    Ok(())
}

/// Split credential keys out of `config.json` the first time it is seen
/// without an `auth.json` next to it.
fn split_credentials(dir: &Path) -> Result<(), ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    let auth_path = dir.join(AUTH_FILE);
    if !config_path.exists() || auth_path.exists() {
        return Ok(());
    }
    let document = read_document(&config_path)?;
    let (auth, clean): (Map<String, Value>, Map<String, Value>) = document
        .into_iter()
        .partition(|(key, _)| AUTH_FIELDS.contains(&key.as_str()));
    write_document(&config_path, &clean)?;
    write_document(&auth_path, &auth)?;
    info!(fields = auth.len(), "split credentials into {AUTH_FILE}");
    Ok(())
}

fn write_default_documents(dir: &Path) -> Result<(), ConfigError> {
    let mut document = Map::new();
    document.insert("api_path".to_string(), Value::String(String::new()));
    document.insert(
        "update_interval".to_string(),
        Value::from(default_update_interval()),
    );
    document.insert(
        "initial_tabs".to_string(),
        Value::String(default_initial_tabs()),
    );
    write_document(&dir.join(CONFIG_FILE), &document)?;

    let auth_path = dir.join(AUTH_FILE);
    if !auth_path.exists() {
        let mut auth = Map::new();
        auth.insert("username".to_string(), Value::String(String::new()));
        auth.insert("password".to_string(), Value::String(String::new()));
        write_document(&auth_path, &auth)?;
    }
    info!(dir = %dir.display(), "wrote default configuration");
    Ok(())
}
