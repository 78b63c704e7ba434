//! HTML templates and styling for the proofing shop.
//!
//! This module contains all CSS styles, JavaScript code, and HTML
//! generation functions for the web interface.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants
//! - `components` - Shared HTML components (nav bar, base template, copy-link script)
//! - `gallery` - Gallery page surface and the browser cart script

mod components;
mod gallery;
mod styles;

pub use components::{base_html, copy_link_script, html_escape, message_html, nav_bar, MessageKind};
pub use gallery::{gallery_script, HtmlGallery};
pub use styles::STYLE;
