//! Error types for kiosk-player

use thiserror::Error;

/// Broad error classes, used for exit codes and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Persistence errors
    StorageError,
    QuotaExceeded,

    // Playback errors
    MediaError,
    MissingDependency,

    // User errors
    InvalidConfig,

    // System errors
    FileError,
    SpawnError,
    ClipboardError,
}

/// Failures of the durable key-value area
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode stored value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
}

/// Failures reported by a media element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Playback request rejected: {0}")]
    Rejected(String),

    #[error("Operation not supported by this media element")]
    NotSupported,

    #[error("Media IPC error: {0}")]
    Ipc(String),

    #[error("Media element is closed")]
    Closed,
}

/// Main error type for kiosk-player
#[derive(Error, Debug)]
pub enum KioskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Missing dependency: {0}. Please install it.")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl KioskError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Store(StoreError::QuotaExceeded { .. }) => ErrorCode::QuotaExceeded,
            Self::Store(_) => ErrorCode::StorageError,
            Self::Media(_) => ErrorCode::MediaError,
            Self::MissingDependency(_) => ErrorCode::MissingDependency,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::File(_) => ErrorCode::FileError,
            Self::Json(_) => ErrorCode::InvalidConfig,
            Self::Spawn(_) => ErrorCode::SpawnError,
            Self::Clipboard(_) => ErrorCode::ClipboardError,
        }
    }
}

impl ErrorCode {
    /// Process exit status, following sysexits.h
    pub fn exit_status(self) -> u8 {
        match self {
            Self::InvalidConfig => 78,
            Self::MissingDependency | Self::ClipboardError => 69,
            Self::SpawnError => 71,
            Self::QuotaExceeded => 73,
            Self::StorageError | Self::FileError => 74,
            Self::MediaError => 70,
        }
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
