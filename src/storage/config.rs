//! Configuration management

use crate::error::{KioskError, Result};
use crate::types::Config;
use crate::utils::paths::{ensure_dir, get_config_dir, get_config_path, get_store_dir};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use url::Url;

/// Load configuration from file, merging with defaults
pub async fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()).await
}

/// Load configuration from an explicit path
pub async fn load_config_from(config_path: &str) -> Result<Config> {
    if !Path::new(config_path).exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path).await?;
    let user_config: Config = serde_json::from_str(&content)?;

    // Merge with defaults (user config takes precedence)
    let mut config = Config::default();
    config.data_dir = user_config.data_dir;
    config.locale = user_config.locale.filter(|l| !l.trim().is_empty());
    config.headless_duration_secs = user_config.headless_duration_secs.max(1);

    if !user_config.share_url.is_empty() {
        Url::parse(&user_config.share_url)
            .map_err(|e| KioskError::InvalidConfig(format!("share_url '{}': {}", user_config.share_url, e)))?;
        config.share_url = user_config.share_url;
    }
    if !user_config.editor.is_empty() {
        config.editor = user_config.editor;
    }

    Ok(config)
}

/// Save configuration to file
pub async fn save_config(config: &Config) -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(get_config_path(), content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !Path::new(&config_path).exists() {
        save_config(&Config::default()).await?;
    }

    Command::new(editor)
        .arg(&config_path)
        .status()
        .await
        .map_err(|e| KioskError::Spawn(format!("Failed to start {}: {}", editor, e)))?;

    Ok(())
}

/// Directory the store lives in, honoring the config override
pub fn resolve_store_dir(config: &Config) -> String {
    if config.data_dir.is_empty() {
        get_store_dir()
    } else {
        config.data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = load_config_from(&path.to_string_lossy()).await.unwrap();
        assert_eq!(config.share_url, "http://localhost:8080/");
        assert!(config.locale.is_none());
    }

    #[tokio::test]
    async fn test_user_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"share_url":"https://kiosk.example/lobby/","locale":"ru","headless_duration_secs":0,"editor":""}"#,
        )
        .unwrap();

        let config = load_config_from(&path.to_string_lossy()).await.unwrap();
        assert_eq!(config.share_url, "https://kiosk.example/lobby/");
        assert_eq!(config.locale.as_deref(), Some("ru"));
        assert_eq!(config.headless_duration_secs, 1);
        assert_eq!(config.editor, "nvim");
    }

    #[tokio::test]
    async fn test_bad_share_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"share_url":"not a url"}"#).unwrap();

        let err = load_config_from(&path.to_string_lossy()).await.unwrap_err();
        assert!(matches!(err, KioskError::InvalidConfig(_)));
    }

    #[test]
    fn test_store_dir_override() {
        let config = Config {
            data_dir: "/srv/kiosk".into(),
            ..Config::default()
        };
        assert_eq!(resolve_store_dir(&config), "/srv/kiosk");
    }
}
