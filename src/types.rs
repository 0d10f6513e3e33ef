//! Type definitions for kiosk-player
//!
//! Source of truth for all data structures shared between the surfaces.

use serde::{Deserialize, Serialize};

// ============================================
// Persisted Entities
// ============================================

/// Store key holding [`VideoData`]
pub const VIDEO_DATA_KEY: &str = "videoData";

/// Store key holding [`StatsData`]
pub const STATS_DATA_KEY: &str = "statsData";

/// Operator configuration: which video to play and whether to play it at all
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    /// Absolute location of the media resource, may be empty
    pub url: String,
    /// Operator kill-switch
    pub is_enabled: bool,
}

impl VideoData {
    /// Playback is permitted iff the video is enabled and has a URL.
    pub fn playback_permitted(&self) -> bool {
        self.is_enabled && !self.url.is_empty()
    }
}

/// Aggregate view counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub total_views: u64,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store directory (empty = XDG data dir)
    pub data_dir: String,
    /// Base URL of the deployed player, used for the shareable link
    pub share_url: String,
    /// Two-letter language tag, overrides the environment
    pub locale: Option<String>,
    /// Clip length simulated by the headless media element
    pub headless_duration_secs: u64,
    /// Editor command for `config --edit`
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            share_url: "http://localhost:8080/".into(),
            locale: None,
            headless_duration_secs: 10,
            editor: "nvim".into(),
        }
    }
}

// ============================================
// Playback Types
// ============================================

/// Transient playback UI state, fresh on every Player mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub show_controls: bool,
    pub video_ended: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            show_controls: true,
            video_ended: false,
        }
    }
}

/// Coarse playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet played, controls visible
    Idle,
    /// Controls hidden by default
    Playing,
    /// Controls visible
    Paused,
    /// Controls visible, replay affordance shown
    Ended,
}

/// What the single playback button does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Play,
    Pause,
    Replay,
}

// ============================================
// Selector Types
// ============================================

/// Item displayed in selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}

// ============================================
// Navigation Types
// ============================================

/// The two surfaces of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Player,
    Admin,
}
