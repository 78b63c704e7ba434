//! Runtime configuration, read from `PROOFROOM_*` environment variables.

use log::LevelFilter;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = ".proofroom_db";
pub const DEFAULT_MEDIA_DIR: &str = "media";
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    /// Scheme, host and port used to build share links, without a trailing slash.
    pub public_origin: String,
    /// Admin password; the admin area is disabled when unset.
    pub admin_password: Option<String>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            addr: get("PROOFROOM_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            db_path: PathBuf::from(get("PROOFROOM_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            media_dir: PathBuf::from(
                get("PROOFROOM_MEDIA").unwrap_or_else(|| DEFAULT_MEDIA_DIR.to_string()),
            ),
            public_origin: get("PROOFROOM_PUBLIC_ORIGIN")
                .map(|o| o.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_PUBLIC_ORIGIN.to_string()),
            admin_password: get("PROOFROOM_PASSWORD"),
            log_level: get("PROOFROOM_LOG")
                .and_then(|l| l.parse().ok())
                .unwrap_or(LevelFilter::Info),
        }
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_password.is_some()
    }

    /// Served under `/media`: gallery previews and payment receipts.
    pub fn public_media_dir(&self) -> PathBuf {
        self.media_dir.join("public")
    }

    /// Uploaded originals. Never served.
    pub fn originals_dir(&self) -> PathBuf {
        self.media_dir.join("originals")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.public_origin, DEFAULT_PUBLIC_ORIGIN);
        assert!(!config.admin_enabled());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PROOFROOM_PUBLIC_ORIGIN", "https://photos.example.com/"),
            ("PROOFROOM_PASSWORD", "hunter2"),
            ("PROOFROOM_LOG", "debug"),
            ("PROOFROOM_MEDIA", ""),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.public_origin, "https://photos.example.com");
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.media_dir, PathBuf::from(DEFAULT_MEDIA_DIR));
    }
}
