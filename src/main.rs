//! proofroom - photo proofing and print ordering.
//!
//! This is the main entry point for the web server and the `share-link`
//! helper. The application is organized into the following modules:
//!
//! - `cart`: Photo selection state machine and its rendering surfaces
//! - `clipboard`: Copy-with-fallback for share links
//! - `models` / `store`: Albums, photos, formats and orders in sled
//! - `orders`: Re-pricing submitted checkouts
//! - `auth`: Admin session management
//! - `templates`: HTML/CSS/JS templates and rendering
//! - `handlers` / `admin`: HTTP route handlers

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use simple_logger::SimpleLogger;
use std::io::Write;
use std::sync::Arc;
use tower_http::services::ServeDir;

use proofroom::clipboard::{
    absolute_url, copy_with_fallback, default_strategies, flash_success, ClipboardError,
    CopyStrategy, CopyTrigger, FEEDBACK_DURATION,
};
use proofroom::{admin, handlers, AppState, Config};

/// Upload limit for photo batches and receipts.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "proofroom")]
#[command(about = "Photo proofing galleries and print orders")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Copy the public URL of a site path, e.g. /album/<token>
    ShareLink {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    SimpleLogger::new()
        .with_level(config.log_level)
        .init()
        .context("Failed to initialise logging")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::ShareLink { path } => share_link(&config, &path).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.addr.clone();
    let public_dir = config.public_media_dir();
    let admin_enabled = config.admin_enabled();
    let state = Arc::new(AppState::open(config).context("Failed to open storage")?);

    let app = Router::new()
        // Public routes
        .route("/", get(handlers::landing).post(handlers::landing_submit))
        .route("/album/{token}", get(handlers::album_detail))
        .route("/orders", post(handlers::create_order))
        .route("/orders/full-set/{album_id}", post(handlers::full_set_order))
        .route("/orders/{id}/confirmation", get(handlers::order_confirmation))
        .route("/orders/{id}/receipt", post(handlers::upload_receipt))
        .route("/orders/{id}/complete", get(handlers::order_complete))
        // Auth routes
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
        // Admin routes
        .route("/admin/albums", get(admin::admin_albums).post(admin::create_album_api))
        .route("/admin/albums/{id}/parent", post(admin::move_album_api))
        .route("/admin/albums/{id}/photos", post(admin::upload_photos))
        .route("/admin/formats", post(admin::create_format_api))
        .route("/admin/orders", get(admin::admin_orders))
        .route("/admin/orders/export.csv", get(admin::export_orders_csv))
        .route("/admin/orders/{id}/status", post(admin::set_status_api))
        .nest_service("/media", ServeDir::new(&public_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!("proofroom running at http://{}", addr);
    log::info!("Public media: {}", public_dir.display());
    if admin_enabled {
        log::info!("Admin: ENABLED (PROOFROOM_PASSWORD set)");
    } else {
        log::warn!("Admin: DISABLED (set PROOFROOM_PASSWORD to enable)");
    }

    axum::serve(listener, app).await.context("Server error")
}

// ============================================================================
// Share Link
// ============================================================================

/// One-line status on stderr that can be redrawn in place.
struct StatusLine {
    label: String,
    success: bool,
}

impl StatusLine {
    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let color = if self.success { "\x1b[32m" } else { "" };
        write!(out, "\r\x1b[2K{}{}\x1b[0m", color, self.label)?;
        out.flush()
    }

    fn draw(&self) {
        if let Err(e) = self.write_to(&mut std::io::stderr()) {
            log::warn!("Could not draw status line: {}", e);
        }
    }
}

impl CopyTrigger for StatusLine {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.draw();
    }

    fn set_success_style(&mut self) {
        self.success = true;
        self.draw();
    }

    fn reset_style(&mut self) {
        self.success = false;
        self.draw();
    }
}

async fn share_link(config: &Config, path: &str) -> anyhow::Result<()> {
    let url = absolute_url(&config.public_origin, path);
    let via = copy_or_print(&url, &default_strategies(), &mut std::io::stdout())?;

    log::debug!("Copied {} via {}", url, via);
    let mut line = StatusLine { label: url, success: false };
    flash_success(&mut line, FEEDBACK_DURATION).await;
    eprintln!();
    Ok(())
}

/// Copy `url`, or print it to `out` for manual copying and fail.
fn copy_or_print<W: Write>(
    url: &str,
    strategies: &[Box<dyn CopyStrategy>],
    out: &mut W,
) -> anyhow::Result<&'static str> {
    match copy_with_fallback(url, strategies) {
        Ok(via) => Ok(via),
        Err(ClipboardError::Unavailable { text }) => {
            writeln!(out, "{}", text).context("Failed to print the link")?;
            anyhow::bail!("No clipboard available, copy the link above manually")
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_escapes() {
        let mut out = Vec::new();
        StatusLine { label: "https://example.com/album/t".to_string(), success: true }
            .write_to(&mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\r\x1b[2K\x1b[32mhttps://example.com/album/t\x1b[0m"
        );
    }

    #[test]
    fn test_no_clipboard_prints_link_and_fails() {
        let mut out = Vec::new();
        let err = copy_or_print("https://example.com/album/t", &[], &mut out).unwrap_err();

        assert_eq!(String::from_utf8(out).unwrap(), "https://example.com/album/t\n");
        assert!(err.to_string().contains("copy the link above manually"));
    }
}
