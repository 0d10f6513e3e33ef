//! Write-only clipboard access

use crate::error::{KioskError, Result};
use crate::utils::process::is_command_available;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Somewhere to put a shareable link
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Clipboard helpers tried in order: (program, args)
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("pbcopy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// The desktop clipboard, via whichever helper is installed
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    async fn detect_tool() -> Option<(&'static str, &'static [&'static str])> {
        for &(cmd, args) in CLIPBOARD_TOOLS {
            if is_command_available(cmd).await {
                return Some((cmd, args));
            }
        }
        None
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let Some((cmd, args)) = Self::detect_tool().await else {
            return Err(KioskError::MissingDependency(
                "a clipboard tool (wl-copy, pbcopy, xclip or xsel)".into(),
            ));
        };
        debug!(tool = cmd, "Copying to clipboard");

        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| KioskError::Spawn(format!("Failed to start {}: {}", cmd, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(KioskError::Clipboard(format!(
                "{} exited with code: {:?}",
                cmd,
                status.code()
            )));
        }
        Ok(())
    }
}
