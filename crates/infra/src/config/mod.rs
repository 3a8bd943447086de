//! Configuration loading and management
//!
//! This module provides the client configuration and utilities for loading
//! it from environment variables and files.

mod client_config;
pub mod loader;

// Re-export commonly used items
pub use client_config::ClientConfig;
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
