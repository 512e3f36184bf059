//! # kenbio Common Library
//!
//! Shared code for the kenbio workspace:
//! - TOML bootstrap configuration and config file resolution
//! - Common error type
//! - Tracing subscriber setup
//! - HTTP user-agent string

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
