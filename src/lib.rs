//! kiosk-player library
//!
//! One operator-configured video, a touch-style player for it, and a local view counter.

pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
