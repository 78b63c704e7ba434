//! proofroom library - re-exports for testing and external use.
//!
//! This module provides public access to all the application's modules
//! for testing purposes and potential library use.

use axum_extra::extract::CookieJar;
use sled::Db;
use std::path::Path;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod orders;
pub mod preview;
pub mod pricing;
pub mod store;
pub mod templates;

pub use config::Config;
pub use error::AppError;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Db,
}

impl AppState {
    pub fn open(config: Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(config.public_media_dir())?;
        std::fs::create_dir_all(config.originals_dir())?;
        let db = sled::open(&config.db_path).map_err(store::StoreError::from)?;
        Ok(Self { config, db })
    }

    pub fn is_admin(&self, jar: &CookieJar) -> bool {
        auth::is_logged_in(jar, self.config.admin_password.as_deref())
    }
}

// ============================================================================
// Media Files
// ============================================================================

/// Reduce an uploaded file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write an upload under `media_dir/subdir` and return its media-relative path.
pub async fn store_media_file(
    media_dir: &Path,
    subdir: &str,
    prefix: &str,
    original_name: &str,
    bytes: &[u8],
) -> std::io::Result<String> {
    let relative = format!("{}/{}_{}", subdir, prefix, sanitize_file_name(original_name));
    let full = media_dir.join(&relative);
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&full, bytes).await?;
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("IMG_0001.JPG"), "IMG_0001.JPG");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my pic.jpg"), "my_pic.jpg");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("фото.png"), "____.png");
    }

    #[tokio::test]
    async fn test_store_media_file() {
        let dir = std::env::temp_dir().join(format!("proofroom-media-{}", std::process::id()));
        let relative = store_media_file(&dir, "receipts", "12", "bank slip.pdf", b"%PDF")
            .await
            .unwrap();

        assert_eq!(relative, "receipts/12_bank_slip.pdf");
        assert_eq!(std::fs::read(dir.join(&relative)).unwrap(), b"%PDF");
        std::fs::remove_dir_all(&dir).ok();
    }
}
