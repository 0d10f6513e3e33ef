//! Path utilities for kiosk-player
//!
//! Respects XDG Base Directory Specification

use crate::error::Result;
use std::env;
use tokio::fs;

const APP_NAME: &str = "kiosk-player";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/kiosk-player
pub fn get_config_dir() -> String {
    let base = env::var("XDG_CONFIG_HOME")
        .unwrap_or_else(|_| {
            dirs::config_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("{}/.config", env::var("HOME").unwrap_or_default()))
        });

    format!("{}/{}", base, APP_NAME)
}

/// Get data directory path
/// Respects XDG_DATA_HOME, defaults to ~/.local/share/kiosk-player
pub fn get_data_dir() -> String {
    let base = env::var("XDG_DATA_HOME")
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("{}/.local/share", env::var("HOME").unwrap_or_default()))
        });

    format!("{}/{}", base, APP_NAME)
}

/// Get the durable key-value directory
pub fn get_store_dir() -> String {
    format!("{}/store", get_data_dir())
}

/// Get config file path
pub fn get_config_path() -> String {
    format!("{}/config.json", get_config_dir())
}

/// Get a fresh IPC socket path for one mpv instance
pub fn get_ipc_socket_path() -> String {
    let runtime = env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| env::temp_dir().to_string_lossy().to_string());
    format!("{}/{}-mpv-{}.sock", runtime, APP_NAME, std::process::id())
}

/// Ensure a directory exists
pub async fn ensure_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}
