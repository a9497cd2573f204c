//! Runtime settings: defaults, then `qr-order.toml`, then `QR_ORDER__*` environment
//! variables. Values that fail to parse are logged and skipped.

use crate::status::{StatusPolicy, DEFAULT_GRACE_MINUTES};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const CONFIG_FILE: &str = "qr-order.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    /// File the local key-value store is kept in.
    pub storage_path: PathBuf,
    pub poll_interval: Duration,
    pub grace_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1337".to_string(),
            storage_path: PathBuf::from("./qr-order-storage.json"),
            poll_interval: Duration::from_secs(30),
            grace_minutes: DEFAULT_GRACE_MINUTES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    storage_path: Option<PathBuf>,
    poll_interval_secs: Option<u64>,
    grace_minutes: Option<u32>,
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "Ignoring unparsable setting");
            None
        }
    }
}

impl Settings {
    /// Overrides fields present in a TOML document.
    pub fn apply_file(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let file: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.storage_path {
            self.storage_path = v;
        }
        if let Some(v) = file.poll_interval_secs.filter(|s| *s > 0) {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = file.grace_minutes {
            self.grace_minutes = v;
        }
        Ok(())
    }

    /// Overrides fields from `QR_ORDER__*` variables, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("QR_ORDER__BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("QR_ORDER__STORAGE_PATH") {
            self.storage_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("QR_ORDER__POLL_INTERVAL_SECS")
            .and_then(|raw| parse_env::<u64>("QR_ORDER__POLL_INTERVAL_SECS", &raw))
            .filter(|s| *s > 0)
        {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = lookup("QR_ORDER__GRACE_MINUTES")
            .and_then(|raw| parse_env::<u32>("QR_ORDER__GRACE_MINUTES", &raw))
        {
            self.grace_minutes = v;
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
    }

    pub fn status_policy(&self) -> StatusPolicy {
        StatusPolicy {
            grace_minutes: self.grace_minutes,
            ..StatusPolicy::default()
        }
    }
}

/// Loads settings from `path` (or [`CONFIG_FILE`]) and the process environment.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();
    let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(e) = settings.apply_file(&raw) {
            warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
        }
    }
    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn file_then_env_override_defaults() {
        let mut settings = Settings::default();
        settings
            .apply_file("base_url = \"http://10.0.0.5:1337\"\npoll_interval_secs = 10\n")
            .unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(10));

        let env: HashMap<&str, &str> = [
            ("QR_ORDER__BASE_URL", "https://api.example.com/"),
            ("QR_ORDER__GRACE_MINUTES", "5"),
            ("QR_ORDER__POLL_INTERVAL_SECS", "soon"),
        ]
        .into();
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.grace_minutes, 5);
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert_eq!(settings.status_policy().grace_minutes, 5);
        assert_eq!(settings.storage_path, Settings::default().storage_path);
    }

    #[test]
    fn invalid_file_is_an_error_and_changes_nothing() {
        let mut settings = Settings::default();
        assert!(settings.apply_file("poll_interval_secs = \"x\"").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.toml")));
        assert_eq!(settings.grace_minutes, DEFAULT_GRACE_MINUTES);
    }
}
