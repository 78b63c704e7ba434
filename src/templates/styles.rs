//! CSS styles for the proofing shop.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --red: #dc322f;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --success: #28a745;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
    padding-bottom: 8rem;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    z-index: 100;
}
.nav-bar .spacer { flex: 1; }
.nav-bar a { font-size: 0.9rem; }

.message { padding: 0.75rem 1rem; border-radius: 4px; margin: 1rem 0; background: var(--accent); }
.message.error { color: var(--red); }
.message.warning { color: var(--base01); }

.access-form, .login-form { max-width: 360px; margin: 3rem auto; display: flex; flex-direction: column; gap: 0.75rem; }
input, select, textarea {
    padding: 0.5rem 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: white;
    color: var(--fg);
    font-size: 0.95rem;
    font-family: inherit;
}
button {
    padding: 0.5rem 1rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--accent);
    color: var(--fg);
    cursor: pointer;
    font-size: 0.95rem;
}
button.primary { background: var(--blue); color: white; border-color: var(--blue); }

.album-list { list-style: none; }
.album-item {
    padding: 0.75rem 0;
    border-bottom: 1px solid var(--border);
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 1rem;
}
.album-item .meta { font-size: 0.8rem; color: var(--muted); white-space: nowrap; }
.folder-badge {
    font-size: 0.65rem;
    padding: 0.1rem 0.4rem;
    background: var(--accent);
    border-radius: 3px;
    text-transform: uppercase;
    margin-right: 0.5rem;
}
.copy-link-btn { background: #eee; color: #333; font-size: 0.8rem; transition: background-color 0.2s; }

/* Gallery */
.photo-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
    gap: 0.75rem;
}
.photo-card {
    position: relative;
    cursor: pointer;
    border: 3px solid transparent;
    border-radius: 6px;
    overflow: hidden;
    background: var(--accent);
}
.photo-card img { display: block; width: 100%; height: 200px; object-fit: cover; }
.preview-pending { height: 200px; display: flex; align-items: center; justify-content: center; color: var(--base01); }
.photo-card.selected { border-color: var(--green); }
.selected-icon {
    position: absolute;
    top: 0.4rem;
    right: 0.4rem;
    background: var(--green);
    color: white;
    border-radius: 50%;
    width: 1.8rem;
    height: 1.8rem;
    text-align: center;
    line-height: 1.8rem;
}
.hidden { display: none; }

.order-panel {
    position: fixed;
    left: 0;
    right: 0;
    bottom: 0;
    background: white;
    border-top: 1px solid var(--border);
    box-shadow: 0 -2px 8px rgba(0, 0, 0, 0.08);
    padding: 1rem;
    transition: transform 0.3s ease;
    z-index: 200;
}
.order-panel form { display: flex; flex-wrap: wrap; gap: 0.5rem; align-items: center; max-width: 1100px; margin: 0 auto; }
.order-summary { font-weight: 600; margin-right: auto; }

.order-table { width: 100%; border-collapse: collapse; margin: 1rem 0; }
.order-table th, .order-table td { text-align: left; padding: 0.4rem 0.5rem; border-bottom: 1px solid var(--border); }
.order-table td.num, .order-table th.num { text-align: right; }
.order-filter { display: flex; gap: 0.5rem; align-items: center; margin: 1rem 0; }
.status-badge { font-size: 0.75rem; padding: 0.1rem 0.5rem; background: var(--accent); border-radius: 3px; }
"#;
