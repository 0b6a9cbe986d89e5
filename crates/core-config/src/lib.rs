//! Configuration loading and parsing.
//!
//! Parses `notedown.toml` (or an override path provided by the binary).
//! Unknown fields are ignored and a missing or unparseable file falls back to
//! defaults, so a stale config never blocks startup. The autosave delay is
//! clamped into a sane band when applied.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::fs;
use tracing::{info, warn};

const FILE_NAME: &str = "notedown.toml";
const APP_DIR: &str = "notedown";

/// Bounds for the effective autosave delay, milliseconds.
const AUTOSAVE_MIN_MS: u64 = 100;
const AUTOSAVE_MAX_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Clone)]
pub struct AutosaveConfig {
    #[serde(default = "AutosaveConfig::default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: Self::default_delay_ms(),
        }
    }
}

impl AutosaveConfig {
    const fn default_delay_ms() -> u64 {
        750
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StoreConfig {
    /// Path of the JSON data file. Relative paths resolve against the
    /// working directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    /// Start new notes with a date header line.
    #[serde(default = "EditorConfig::default_date_header")]
    pub date_header: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            date_header: Self::default_date_header(),
        }
    }
}

impl EditorConfig {
    const fn default_date_header() -> bool {
        false
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

impl Config {
    /// Autosave delay clamped into the supported band.
    pub fn autosave_delay(&self) -> Duration {
        let raw = self.file.autosave.delay_ms;
        let clamped = raw.clamp(AUTOSAVE_MIN_MS, AUTOSAVE_MAX_MS);
        if clamped != raw {
            info!(target: "config", raw, clamped, "autosave_delay_clamped");
        }
        Duration::from_millis(clamped)
    }

    /// Data file location: configured path, else the platform data dir, else
    /// the working directory.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.file.store.path {
            return path.clone();
        }
        if let Some(dir) = dirs::data_dir() {
            return dir.join(APP_DIR).join("notes.json");
        }
        PathBuf::from("notes.json")
    }

    pub fn date_header(&self) -> bool {
        self.file.editor.date_header
    }
}

/// Best-effort config path: local `notedown.toml` first, then the platform
/// config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR).join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config loaded");
                Ok(Config { file })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "parse failed, using defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(750));
        assert!(!config.date_header());
    }

    #[test]
    fn parses_known_fields_and_ignores_unknown() {
        let (_dir, path) = write_config(
            r#"
            [autosave]
            delay_ms = 500

            [store]
            path = "/tmp/notes.json"

            [editor]
            date_header = true
            future_option = "ignored"
            "#,
        );
        let config = load_from(Some(path)).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/notes.json"));
        assert!(config.date_header());
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let (_dir, path) = write_config("this is [not toml");
        let config = load_from(Some(path)).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(750));
    }

    #[test]
    fn autosave_delay_is_clamped() {
        let (_dir, path) = write_config("[autosave]\ndelay_ms = 10\n");
        let config = load_from(Some(path)).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(100));

        let (_dir, path) = write_config("[autosave]\ndelay_ms = 60000\n");
        let config = load_from(Some(path)).unwrap();
        assert_eq!(config.autosave_delay(), Duration::from_millis(5_000));
    }
}
