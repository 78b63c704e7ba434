//! Shared HTML components for the proofing shop.
//!
//! Contains the navigation bar, the base HTML template, flash messages and
//! the admin "copy link" script.

use crate::clipboard::{FEEDBACK_DURATION, SUCCESS_LABEL};

use super::styles::STYLE;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(logged_in: bool) -> String {
    let admin_links = if logged_in {
        r#"<a href="/admin/albums">Albums</a>
            <a href="/admin/orders">Orders</a>
            <a href="/logout">Logout</a>"#
    } else {
        ""
    };

    format!(
        r#"<nav class="nav-bar">
            <a href="/">Home</a>
            <span class="spacer"></span>
            {}
        </nav>"#,
        admin_links
    )
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Warning,
    Info,
}

pub fn message_html(kind: MessageKind, text: &str) -> String {
    let class = match kind {
        MessageKind::Error => "message error",
        MessageKind::Warning => "message warning",
        MessageKind::Info => "message",
    };
    format!(r#"<div class="{}">{}</div>"#, class, html_escape(text))
}

// ============================================================================
// Base Template
// ============================================================================

pub fn base_html(title: &str, content: &str, logged_in: bool, script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
    <script>{script}</script>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(logged_in),
        content = content,
        script = script,
    )
}

// ============================================================================
// Copy Link Script
// ============================================================================

/// Browser side of the share-link copy: Clipboard API in a secure context,
/// hidden-textarea `execCommand('copy')` otherwise, and an alert with the URL
/// when both fail.
pub fn copy_link_script() -> String {
    format!(
        r#"
    function copyToClipboard(relativePath, btn) {{
        const fullUrl = window.location.origin + relativePath;

        if (navigator.clipboard && window.isSecureContext) {{
            navigator.clipboard.writeText(fullUrl)
                .then(() => showCopySuccess(btn))
                .catch(err => {{
                    console.error('Clipboard API failed:', err);
                    legacyCopy(fullUrl, btn);
                }});
        }} else {{
            legacyCopy(fullUrl, btn);
        }}
    }}

    function legacyCopy(fullUrl, btn) {{
        const textArea = document.createElement('textarea');
        textArea.value = fullUrl;
        textArea.style.position = 'fixed';
        textArea.style.left = '-9999px';
        document.body.appendChild(textArea);
        textArea.focus();
        textArea.select();
        let copied = false;
        try {{
            copied = document.execCommand('copy');
        }} catch (err) {{
            console.error('Copy failed:', err);
        }}
        document.body.removeChild(textArea);
        if (copied) {{
            showCopySuccess(btn);
        }} else {{
            alert('Could not copy automatically, copy this manually: ' + fullUrl);
        }}
    }}

    function showCopySuccess(btn) {{
        const originalText = btn.innerHTML;
        btn.innerHTML = {success_label};
        btn.style.backgroundColor = 'var(--success)';
        btn.style.color = 'white';

        setTimeout(() => {{
            btn.innerHTML = originalText;
            btn.style.backgroundColor = '';
            btn.style.color = '';
        }}, {feedback_ms});
    }}
"#,
        success_label = serde_json::to_string(SUCCESS_LABEL).unwrap_or_else(|_| "\"\"".to_string()),
        feedback_ms = FEEDBACK_DURATION.as_millis(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_copy_script_uses_feedback_duration() {
        let script = copy_link_script();
        assert!(script.contains("}, 2000);"));
        assert!(script.contains("window.isSecureContext"));
        assert!(script.contains("execCommand('copy')"));
    }

    #[test]
    fn test_nav_shows_admin_links_only_when_logged_in() {
        assert!(nav_bar(true).contains("/admin/orders"));
        assert!(!nav_bar(false).contains("/admin/orders"));
    }
}
