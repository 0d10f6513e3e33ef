//! Core modules: playback control, view counting, the two surfaces

pub mod admin;
pub mod clipboard;
pub mod controller;
pub mod media;
#[cfg(unix)]
pub mod mpv;
pub mod player;
pub mod reporter;
