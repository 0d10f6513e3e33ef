//! Storage modules: durable key-value store, config

pub mod config;
pub mod store;

pub use store::{Backend, FileBackend, MemoryBackend, Persisted, Store};
