//! ragpipe Core Library
//!
//! This crate provides the foundational utilities shared by the RAG pipe:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (`AppConfig`, `PipeConfig`)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ConfigOverrides, PipeConfig, ResponseFlavor};
pub use error::{AppError, AppResult};
