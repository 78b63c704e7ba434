//! Copy-to-clipboard with fallback.
//!
//! Share links are copied by trying each available `CopyStrategy` in turn:
//! a native clipboard tool first, then the terminal's OSC 52 escape. When
//! nothing works the caller gets the text back so it can be shown for manual
//! copying. The admin page carries a browser rendition of the same chain
//! (see `templates::components::copy_link_script`).

use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::{IsTerminal, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;

/// How long a trigger shows its success label before reverting.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(2000);

pub const SUCCESS_LABEL: &str = "✅ Copied!";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("{tool} failed: {reason}")]
    Strategy { tool: &'static str, reason: String },
    #[error("Could not copy automatically, copy this manually: {text}")]
    Unavailable { text: String },
}

/// Join the public origin and a site-relative path.
pub fn absolute_url(origin: &str, relative_path: &str) -> String {
    format!("{}{}", origin, relative_path)
}

// ============================================================================
// Strategies
// ============================================================================

pub trait CopyStrategy {
    fn name(&self) -> &'static str;

    /// Capability check; unavailable strategies are skipped without trying.
    fn is_available(&self) -> bool;

    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard tools tried in order, with their arguments.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
];

/// Copies through the first clipboard tool found on `PATH`.
#[derive(Debug, Default)]
pub struct CommandClipboard;

impl CommandClipboard {
    fn find_tool(&self) -> Option<(&'static str, &'static [&'static str])> {
        let path = std::env::var_os("PATH")?;
        CLIPBOARD_TOOLS
            .iter()
            .copied()
            .find(|(tool, _)| std::env::split_paths(&path).any(|dir| dir.join(tool).is_file()))
    }
}

impl CopyStrategy for CommandClipboard {
    fn name(&self) -> &'static str {
        "clipboard tool"
    }

    fn is_available(&self) -> bool {
        self.find_tool().is_some()
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let (tool, args) = self.find_tool().ok_or(ClipboardError::Strategy {
            tool: "clipboard tool",
            reason: "no clipboard tool on PATH".to_string(),
        })?;
        let fail = |reason: String| ClipboardError::Strategy { tool, reason };

        let child = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| fail(e.to_string()))?;

        let status = feed_and_reap(child, text).map_err(|e| fail(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(fail(format!("exited with {}", status)))
        }
    }
}

/// Write `text` to the child's stdin and wait for it to exit. A failed write
/// kills the child before reaping it.
fn feed_and_reap(mut child: Child, text: &str) -> std::io::Result<ExitStatus> {
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            if let Err(kill_err) = child.kill() {
                log::debug!("Clipboard tool already gone: {}", kill_err);
            }
            child.wait()?;
            return Err(e);
        }
    }
    child.wait()
}

/// Asks the terminal emulator to set the clipboard via OSC 52.
pub struct Osc52Clipboard;

impl Osc52Clipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
    }
}

impl CopyStrategy for Osc52Clipboard {
    fn name(&self) -> &'static str {
        "terminal (OSC 52)"
    }

    fn is_available(&self) -> bool {
        std::io::stderr().is_terminal()
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut err = std::io::stderr();
        err.write_all(Self::sequence(text).as_bytes())
            .and_then(|_| err.flush())
            .map_err(|e| ClipboardError::Strategy {
                tool: "terminal (OSC 52)",
                reason: e.to_string(),
            })
    }
}

/// Native clipboard first, terminal escape second.
pub fn default_strategies() -> Vec<Box<dyn CopyStrategy>> {
    vec![Box::new(CommandClipboard), Box::new(Osc52Clipboard)]
}

/// Try each available strategy in order. Returns the name of the one that
/// worked, or `Unavailable` carrying the text for manual copying.
pub fn copy_with_fallback(
    text: &str,
    strategies: &[Box<dyn CopyStrategy>],
) -> Result<&'static str, ClipboardError> {
    for strategy in strategies {
        if !strategy.is_available() {
            log::debug!("Skipping {}: not available", strategy.name());
            continue;
        }
        match strategy.copy(text) {
            Ok(()) => return Ok(strategy.name()),
            Err(e) => log::warn!("Copy via {} failed: {}", strategy.name(), e),
        }
    }
    Err(ClipboardError::Unavailable {
        text: text.to_string(),
    })
}

// ============================================================================
// Success Feedback
// ============================================================================

/// Something that shows a label, e.g. a button or a status line.
pub trait CopyTrigger {
    fn label(&self) -> String;
    fn set_label(&mut self, label: &str);
    fn set_success_style(&mut self);
    fn reset_style(&mut self);
}

/// Swap in the success label for `duration`, then put the old one back.
pub async fn flash_success<T: CopyTrigger>(trigger: &mut T, duration: Duration) {
    let original = trigger.label();
    trigger.set_label(SUCCESS_LABEL);
    trigger.set_success_style();

    tokio::time::sleep(duration).await;

    trigger.set_label(&original);
    trigger.reset_style();
}
