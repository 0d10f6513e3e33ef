//! Shared helpers: paths, logging, processes, scheduled tasks

pub mod logging;
pub mod paths;
pub mod process;
pub mod timer;
